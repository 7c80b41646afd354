//! Routing and views for the screener client.
//!
//! # Key types
//!
//! - [`Route`]: the three screens (`/`, `/login`, `/application`)
//! - [`RouteGuard`]: keeps anonymous users out of protected routes
//! - [`View`]: renders one route as text from an injected [`ViewContext`]
//! - [`Router`]: path → guard → view, in one call
//! - [`LoginForm`], [`SignupForm`]: client-side form state
//! - [`MarketStats`]: counts shown on the application dashboard

mod application;
mod error;
mod guard;
mod landing;
mod login;
mod route;
mod router;
mod signup;
mod view;

pub use application::{ApplicationView, MarketStats};
pub use error::RouterError;
pub use guard::{GuardDecision, RouteGuard};
pub use landing::LandingView;
pub use login::{LoginForm, LoginView};
pub use route::Route;
pub use router::{Resolution, Router};
pub use signup::{SignupDetails, SignupForm, SignupProgress, SignupStep};
pub use view::{View, ViewContext};
