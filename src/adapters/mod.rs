pub mod waldur;
