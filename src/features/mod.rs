//! Feature transforms over mono waveforms

pub mod mfcc;

pub use mfcc::{Mfcc, MfccOptions};
