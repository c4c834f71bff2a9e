pub mod terminology;
