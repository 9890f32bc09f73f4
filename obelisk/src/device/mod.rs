pub mod tecthulhu;
