// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//!
//! This crate reads [Apache Parquet](https://parquet.apache.org/) files into
//! simple in-memory tables of named, typed columns.
//!
//! # Format Overview
//!
//! Parquet is a columnar format: values are stored along columns instead of
//! rows. Each file carries its metadata in a footer, along with zero or more
//! "row groups", each row group holding one chunk per column. Chunks are
//! split into pages, which are individually encoded and compressed.
//!
//! Data in Parquet files is strongly typed and differentiates between
//! physical types (how bytes are laid out) and logical annotations (what the
//! bytes mean, see [`schema`]). For details about the format itself, see the
//! [Parquet spec].
//!
//! [Parquet spec]: https://github.com/apache/parquet-format/blob/master/README.md#file-format
//!
//! # APIs
//!
//! ## Reading Tables
//!
//! The [`table`] module is the high level entry point. A
//! [`TableReader`](table::TableReader) decodes a whole file into a
//! [`Table`](table::Table), mapping each Parquet column to an output column
//! type driven by its physical type, its annotation and the
//! [`ReadOptions`](table::ReadOptions).
//!
//! ## Metadata and Columns
//!
//! Workloads needing finer-grained control can use the lower-level APIs in
//! [`mod@file`]. These expose the underlying Parquet data model: footer
//! metadata, row groups, and the per-chunk value/level readers of
//! [`column`]. They require knowledge of the underlying format, including
//! [Dremel] record shredding and [Logical Types].
//!
//! [Dremel]: https://research.google/pubs/pub36632/
//! [Logical Types]: https://github.com/apache/parquet-format/blob/master/LogicalTypes.md

#![warn(missing_docs)]

#[macro_use]
pub mod errors;

#[macro_use]
mod macros;

pub mod basic;
pub mod data_type;

mod util;

pub mod column;
pub mod compression;
mod encodings;
pub mod file;
pub mod schema;
pub mod table;

pub mod thrift;
