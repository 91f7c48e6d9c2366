mod simulator;
mod two_body;
