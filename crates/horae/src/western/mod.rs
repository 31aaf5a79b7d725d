pub mod zodiac;

pub use zodiac::{get_sign_index, resolve, ZodiacSign};
