/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Recursive-descent parsing of tokens into games with nested variations.
mod parser;

/// Splitting raw notation text into tokens.
mod token;

pub use parser::*;
pub use token::*;
