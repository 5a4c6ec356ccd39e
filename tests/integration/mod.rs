/// Integration tests against on-disk databases
mod basic_integration;
mod check_in_flow;
