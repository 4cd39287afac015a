pub mod button;
pub mod doctor;
pub mod page;
pub mod profile;
pub mod run;
pub mod serve;
pub mod settings;
pub mod shortcuts;
pub mod trigger;
