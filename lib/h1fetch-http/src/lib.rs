/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod io;
pub use io::{LimitedBufReadExt, LimitedReadUntil};

mod parse;
pub use parse::{HttpChunkedLine, HttpHeaderLine, HttpLineParseError, HttpStatusLine};

mod response;
pub use response::{HttpBodyFraming, HttpRawResponse, HttpResponseParseError, HttpResponseReader};
