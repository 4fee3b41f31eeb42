//! Write-then-read tests covering everything a stored table relies on.

mod layout;
mod styles;
mod values;
