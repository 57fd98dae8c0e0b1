//! fitpr-client: HTTP client library
//!
//! Typed client for the fitpr service. Failed calls carry the service's
//! error body.
//!
//! # Examples
//!
//! ```no_run
//! use fitpr_client::{ClientError, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new("http://localhost:8000")?;
//!
//! let health = client.health().await?;
//! println!("Status: {}", health.status);
//!
//! match client.verify_pin("c1", "2468").await {
//!     Ok(verified) => println!("Welcome {}", verified.client.name),
//!     Err(ClientError::Api(error)) => println!("{}: {}", error.code, error.message),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;

pub use error::{ClientError, Result};
pub use http::HttpClient;
