pub mod case;
pub mod form;
