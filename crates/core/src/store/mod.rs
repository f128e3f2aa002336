mod codec;
mod error;
mod keys;
mod traits;

pub use codec::{decode, encode};
pub use error::{Result, StoreError};
pub use keys::{session_key, state_key};
pub use traits::SessionStore;
