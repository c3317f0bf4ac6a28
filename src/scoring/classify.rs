use crate::types::report::Semaforo;

// Band edges approximate thirds of the 0-10 range. The literal constants are
// part of the product contract: exactly 6.67 is Verde, exactly 3.34 is
// Naranja.
pub const VERDE_MIN: f64 = 6.67;
pub const NARANJA_MIN: f64 = 3.34;

pub fn classify(score: f64) -> Semaforo {
    if score >= VERDE_MIN {
        Semaforo::Verde
    } else if score >= NARANJA_MIN {
        Semaforo::Naranja
    } else {
        Semaforo::Rojo
    }
}
