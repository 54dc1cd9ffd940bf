pub mod building;
pub mod progression;
pub mod stockpile;
pub mod zone;
