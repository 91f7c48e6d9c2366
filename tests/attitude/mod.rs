mod control;
mod rigid_body;
