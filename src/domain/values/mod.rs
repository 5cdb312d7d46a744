pub mod instrument_kind;
pub mod option_side;
pub mod relative_change;
