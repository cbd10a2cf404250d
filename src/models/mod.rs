pub mod enums;
pub mod identity;
pub mod general_info;
pub mod medical_info;
pub mod allergy;

pub use enums::*;
pub use identity::*;
pub use general_info::*;
pub use medical_info::*;
pub use allergy::*;
