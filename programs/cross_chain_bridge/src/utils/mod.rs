pub mod hash;
pub mod lamports;
pub mod pda;
pub mod token;
