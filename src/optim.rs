//! Numerical backends used by the equilibrium solvers.
//!
//! Both backends sit behind a trait so the game code only assembles matrices and
//! never depends on how a problem is actually solved.
mod linear_program;
pub use self::linear_program::*;

mod simplex;
pub use self::simplex::*;

mod constrained;
pub use self::constrained::*;

mod slp;
pub use self::slp::*;

mod optim_error;
pub use optim_error::OptimError;
