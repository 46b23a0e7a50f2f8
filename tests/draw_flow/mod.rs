pub mod support;

mod drawing;
mod selection;
