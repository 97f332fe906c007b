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

//! In-memory tables materialized from Parquet files.
//!
//! [`reader::TableReader`] decodes a whole file into a [`Table`], a list of
//! named, typed columns of equal length. Missing cells are represented
//! explicitly, so every column holds exactly one entry per row.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub(crate) mod builder;
pub(crate) mod convert;
pub mod reader;

pub use reader::{ReadOptions, TableReader};

/// Output type of a materialized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Booleans.
    Boolean,
    /// 32 bit signed integers.
    Integer,
    /// 64 bit signed integers.
    Long,
    /// 32 bit floating point numbers.
    Float,
    /// 64 bit floating point numbers.
    Double,
    /// UTF-8 strings.
    String,
    /// Free-form text, used for rendered repeated cells.
    Text,
    /// Calendar dates without a time zone.
    Date,
    /// Times of day without a time zone.
    Time,
    /// Date and time without a time zone.
    DateTime,
    /// Instants on the UTC timeline.
    Instant,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Cell storage for one column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnData {
    Boolean(Vec<Option<bool>>),
    Integer(Vec<Option<i32>>),
    Long(Vec<Option<i64>>),
    Float(Vec<Option<f32>>),
    Double(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
    Time(Vec<Option<NaiveTime>>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Instant(Vec<Option<DateTime<Utc>>>),
}

impl ColumnData {
    pub(crate) fn len(&self) -> usize {
        match self {
            ColumnData::Boolean(cells) => cells.len(),
            ColumnData::Integer(cells) => cells.len(),
            ColumnData::Long(cells) => cells.len(),
            ColumnData::Float(cells) => cells.len(),
            ColumnData::Double(cells) => cells.len(),
            ColumnData::String(cells) | ColumnData::Text(cells) => cells.len(),
            ColumnData::Date(cells) => cells.len(),
            ColumnData::Time(cells) => cells.len(),
            ColumnData::DateTime(cells) => cells.len(),
            ColumnData::Instant(cells) => cells.len(),
        }
    }

    pub(crate) fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Boolean(_) => ColumnType::Boolean,
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Long(_) => ColumnType::Long,
            ColumnData::Float(_) => ColumnType::Float,
            ColumnData::Double(_) => ColumnType::Double,
            ColumnData::String(_) => ColumnType::String,
            ColumnData::Text(_) => ColumnType::Text,
            ColumnData::Date(_) => ColumnType::Date,
            ColumnData::Time(_) => ColumnType::Time,
            ColumnData::DateTime(_) => ColumnType::DateTime,
            ColumnData::Instant(_) => ColumnType::Instant,
        }
    }

    pub(crate) fn push_missing(&mut self) {
        match self {
            ColumnData::Boolean(cells) => cells.push(None),
            ColumnData::Integer(cells) => cells.push(None),
            ColumnData::Long(cells) => cells.push(None),
            ColumnData::Float(cells) => cells.push(None),
            ColumnData::Double(cells) => cells.push(None),
            ColumnData::String(cells) | ColumnData::Text(cells) => cells.push(None),
            ColumnData::Date(cells) => cells.push(None),
            ColumnData::Time(cells) => cells.push(None),
            ColumnData::DateTime(cells) => cells.push(None),
            ColumnData::Instant(cells) => cells.push(None),
        }
    }
}

/// One named, typed column of a [`Table`].
///
/// Typed accessors return `None` for a missing cell and panic when called on
/// a column of a different type, mirroring the indexing convention of the
/// standard library collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub(crate) fn new(name: String, data: ColumnData) -> Self {
        Self { name, data }
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the output type of this column.
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the cell at `row` is missing.
    ///
    /// Panics if `row` is out of bounds.
    pub fn is_null(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Boolean(cells) => cells[row].is_none(),
            ColumnData::Integer(cells) => cells[row].is_none(),
            ColumnData::Long(cells) => cells[row].is_none(),
            ColumnData::Float(cells) => cells[row].is_none(),
            ColumnData::Double(cells) => cells[row].is_none(),
            ColumnData::String(cells) | ColumnData::Text(cells) => cells[row].is_none(),
            ColumnData::Date(cells) => cells[row].is_none(),
            ColumnData::Time(cells) => cells[row].is_none(),
            ColumnData::DateTime(cells) => cells[row].is_none(),
            ColumnData::Instant(cells) => cells[row].is_none(),
        }
    }

    /// Renders the cell at `row` as a string, or `None` for a missing cell.
    ///
    /// Panics if `row` is out of bounds.
    pub fn get_string(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Boolean(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Integer(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Long(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Float(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Double(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::String(cells) | ColumnData::Text(cells) => cells[row].clone(),
            ColumnData::Date(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Time(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::DateTime(cells) => cells[row].map(|v| v.to_string()),
            ColumnData::Instant(cells) => cells[row].map(|v| v.to_string()),
        }
    }

    /// Returns the boolean at `row`.
    ///
    /// Panics if this is not a `Boolean` column or `row` is out of bounds.
    pub fn get_boolean(&self, row: usize) -> Option<bool> {
        match &self.data {
            ColumnData::Boolean(cells) => cells[row],
            _ => panic!("column {} is not a Boolean column", self.name),
        }
    }

    /// Returns the integer at `row`.
    ///
    /// Panics if this is not an `Integer` column or `row` is out of bounds.
    pub fn get_integer(&self, row: usize) -> Option<i32> {
        match &self.data {
            ColumnData::Integer(cells) => cells[row],
            _ => panic!("column {} is not an Integer column", self.name),
        }
    }

    /// Returns the long at `row`.
    ///
    /// Panics if this is not a `Long` column or `row` is out of bounds.
    pub fn get_long(&self, row: usize) -> Option<i64> {
        match &self.data {
            ColumnData::Long(cells) => cells[row],
            _ => panic!("column {} is not a Long column", self.name),
        }
    }

    /// Returns the float at `row`.
    ///
    /// Panics if this is not a `Float` column or `row` is out of bounds.
    pub fn get_float(&self, row: usize) -> Option<f32> {
        match &self.data {
            ColumnData::Float(cells) => cells[row],
            _ => panic!("column {} is not a Float column", self.name),
        }
    }

    /// Returns the double at `row`.
    ///
    /// Panics if this is not a `Double` column or `row` is out of bounds.
    pub fn get_double(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Double(cells) => cells[row],
            _ => panic!("column {} is not a Double column", self.name),
        }
    }

    /// Returns the string at `row`.
    ///
    /// Panics if this is not a `String` or `Text` column or `row` is out of
    /// bounds.
    pub fn get_str(&self, row: usize) -> Option<&str> {
        match &self.data {
            ColumnData::String(cells) | ColumnData::Text(cells) => cells[row].as_deref(),
            _ => panic!("column {} is not a String or Text column", self.name),
        }
    }

    /// Returns the date at `row`.
    ///
    /// Panics if this is not a `Date` column or `row` is out of bounds.
    pub fn get_date(&self, row: usize) -> Option<NaiveDate> {
        match &self.data {
            ColumnData::Date(cells) => cells[row],
            _ => panic!("column {} is not a Date column", self.name),
        }
    }

    /// Returns the time at `row`.
    ///
    /// Panics if this is not a `Time` column or `row` is out of bounds.
    pub fn get_time(&self, row: usize) -> Option<NaiveTime> {
        match &self.data {
            ColumnData::Time(cells) => cells[row],
            _ => panic!("column {} is not a Time column", self.name),
        }
    }

    /// Returns the date-time at `row`.
    ///
    /// Panics if this is not a `DateTime` column or `row` is out of bounds.
    pub fn get_date_time(&self, row: usize) -> Option<NaiveDateTime> {
        match &self.data {
            ColumnData::DateTime(cells) => cells[row],
            _ => panic!("column {} is not a DateTime column", self.name),
        }
    }

    /// Returns the instant at `row`.
    ///
    /// Panics if this is not an `Instant` column or `row` is out of bounds.
    pub fn get_instant(&self, row: usize) -> Option<DateTime<Utc>> {
        match &self.data {
            ColumnData::Instant(cells) => cells[row],
            _ => panic!("column {} is not an Instant column", self.name),
        }
    }
}

/// A named collection of equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    pub(crate) fn new(name: String, columns: Vec<Column>, num_rows: usize) -> Self {
        Self {
            name,
            columns,
            num_rows,
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column at `i`.
    ///
    /// Panics if `i` is out of bounds.
    pub fn column(&self, i: usize) -> &Column {
        &self.columns[i]
    }

    /// Returns the column named `name`, if any.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    /// Returns all columns in schema order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the (name, type) pairs of all columns in schema order.
    pub fn schema(&self) -> Vec<(&str, ColumnType)> {
        self.columns
            .iter()
            .map(|column| (column.name(), column.column_type()))
            .collect()
    }
}
