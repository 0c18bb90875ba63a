pub mod generation_steps;
