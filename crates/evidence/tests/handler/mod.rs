use super::*;

mod batch;
mod hydrate;
mod index;
