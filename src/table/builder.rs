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

//! Builders accumulating converted cells into columns.

use crate::errors::Result;
use crate::table::convert::CellValue;
use crate::table::{Column, ColumnData, ColumnType};

/// Accumulates one column of a table, one cell per logical row.
pub(crate) struct ColumnBuilder {
    name: String,
    data: ColumnData,
}

impl ColumnBuilder {
    pub(crate) fn new(name: String, column_type: ColumnType, capacity: usize) -> Self {
        let data = match column_type {
            ColumnType::Boolean => ColumnData::Boolean(Vec::with_capacity(capacity)),
            ColumnType::Integer => ColumnData::Integer(Vec::with_capacity(capacity)),
            ColumnType::Long => ColumnData::Long(Vec::with_capacity(capacity)),
            ColumnType::Float => ColumnData::Float(Vec::with_capacity(capacity)),
            ColumnType::Double => ColumnData::Double(Vec::with_capacity(capacity)),
            ColumnType::String => ColumnData::String(Vec::with_capacity(capacity)),
            ColumnType::Text => ColumnData::Text(Vec::with_capacity(capacity)),
            ColumnType::Date => ColumnData::Date(Vec::with_capacity(capacity)),
            ColumnType::Time => ColumnData::Time(Vec::with_capacity(capacity)),
            ColumnType::DateTime => ColumnData::DateTime(Vec::with_capacity(capacity)),
            ColumnType::Instant => ColumnData::Instant(Vec::with_capacity(capacity)),
        };
        Self { name, data }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows appended so far.
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Appends a converted cell, rejecting a value whose kind disagrees with
    /// the column.
    pub(crate) fn append_value(&mut self, value: CellValue) -> Result<()> {
        let column_type = self.data.column_type();
        match (&mut self.data, value) {
            (ColumnData::Boolean(cells), CellValue::Boolean(v)) => cells.push(Some(v)),
            (ColumnData::Integer(cells), CellValue::Integer(v)) => cells.push(Some(v)),
            (ColumnData::Long(cells), CellValue::Long(v)) => cells.push(Some(v)),
            (ColumnData::Float(cells), CellValue::Float(v)) => cells.push(Some(v)),
            (ColumnData::Double(cells), CellValue::Double(v)) => cells.push(Some(v)),
            (ColumnData::String(cells) | ColumnData::Text(cells), CellValue::String(v)) => {
                cells.push(Some(v))
            }
            (ColumnData::Date(cells), CellValue::Date(v)) => cells.push(Some(v)),
            (ColumnData::Time(cells), CellValue::Time(v)) => cells.push(Some(v)),
            (ColumnData::DateTime(cells), CellValue::DateTime(v)) => cells.push(Some(v)),
            (ColumnData::Instant(cells), CellValue::Instant(v)) => cells.push(Some(v)),
            (_, value) => {
                return Err(general_err!(
                    "column {} of type {} cannot hold a value of kind {}",
                    self.name,
                    column_type,
                    value.kind()
                ))
            }
        }
        Ok(())
    }

    /// Appends a missing cell.
    pub(crate) fn append_missing(&mut self) {
        self.data.push_missing();
    }

    pub(crate) fn finish(self) -> Column {
        Column::new(self.name, self.data)
    }
}
