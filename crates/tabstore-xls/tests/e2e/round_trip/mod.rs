//! Write-then-read tests through the BIFF8 codec.

mod layout;
mod styles;
mod values;
