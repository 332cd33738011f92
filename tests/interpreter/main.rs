mod classes;
mod closures;
mod control_flow;
mod errors;
mod functions;
mod helpers;
mod inheritance;
mod scopes;
