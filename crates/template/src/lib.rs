//! # Template
//!
//! Per-recipient message rendering.
//!
//! Tokens:
//! - `&fullname`  - display name
//! - `&firstname` - first word of the display name
//! - `&whatsapp`  - destination address as typed
//! - `&var1`, `&var2`, ... - extra positional fields

mod binding;
mod render;

pub use binding::{
    extra_token, VariableBinding, ADDRESS_TOKEN, EXTRA_TOKEN_PREFIX, FIRSTNAME_TOKEN,
    FULLNAME_TOKEN,
};
pub use render::{referenced_tokens, render, substitute, unbound_tokens};
