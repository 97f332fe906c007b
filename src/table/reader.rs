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

//! High-level reader materializing Parquet files into [`Table`]s.

use std::fs::File;
use std::path::Path;

use bytes::Bytes;

use crate::column::reader::{get_typed_column_reader, ColumnReader};
use crate::data_type::{
    BoolType, ByteArrayType, DataType, DoubleType, FixedLenByteArrayType, FloatType, Int32Type,
    Int64Type, Int96Type,
};
use crate::errors::{ParquetError, Result};
use crate::file::reader::{ChunkReader, FileReader};
use crate::file::serialized_reader::SerializedFileReader;
use crate::schema::types::ColumnDescriptor;
use crate::table::builder::ColumnBuilder;
use crate::table::convert::{column_plan, output_type, CellValue, ColumnPlan};
use crate::table::Table;

/// Number of records requested from a column reader per batch.
const READ_BATCH_SIZE: usize = 1024;

/// Options controlling how a Parquet file maps onto a [`Table`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Overrides the table name derived from the source.
    pub table_name: Option<String>,
    /// Reads INT96 columns as UTC instants instead of strings.
    pub convert_int96_to_timestamp: bool,
    /// Decodes unannotated binary columns as UTF-8 text instead of pairs of
    /// hex digits.
    pub treat_unannotated_binary_as_string: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            table_name: None,
            convert_int96_to_timestamp: false,
            treat_unannotated_binary_as_string: true,
        }
    }
}

/// Reads Parquet files into [`Table`]s.
///
/// # Example
///
/// ```no_run
/// use parquet_table::table::{ReadOptions, TableReader};
///
/// # fn main() -> parquet_table::errors::Result<()> {
/// let reader = TableReader::new(ReadOptions::default());
/// let table = reader.read_path("data.parquet")?;
/// println!("{} rows in {}", table.num_rows(), table.name());
/// # Ok(())
/// # }
/// ```
pub struct TableReader {
    options: ReadOptions,
}

impl TableReader {
    /// Creates a reader applying `options` to every file it reads.
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    /// Reads the Parquet file at `path`.
    ///
    /// Unless overridden by the options, the table is named after the file,
    /// extension included.
    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<Table> {
        let path = path.as_ref();
        let name = match path.file_name() {
            Some(file_name) => file_name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        };
        self.read(File::open(path)?, &name)
    }

    /// Reads an already opened Parquet file.
    pub fn read_file(&self, file: File, default_name: &str) -> Result<Table> {
        self.read(file, default_name)
    }

    /// Reads a Parquet file held in memory.
    pub fn read_bytes(&self, bytes: Bytes, default_name: &str) -> Result<Table> {
        self.read(bytes, default_name)
    }

    /// Reads a Parquet file from any [`ChunkReader`].
    ///
    /// `default_name` names the table when the options carry no override.
    pub fn read<R: ChunkReader + 'static>(&self, source: R, default_name: &str) -> Result<Table> {
        let name = self
            .options
            .table_name
            .clone()
            .unwrap_or_else(|| default_name.to_owned());

        let reader = SerializedFileReader::new(source)?;
        let metadata = reader.metadata().file_metadata();
        let schema = metadata.schema_descr();
        let declared_rows = usize::try_from(metadata.num_rows()).map_err(|_| {
            general_err!(
                "file metadata declares an invalid row count {}",
                metadata.num_rows()
            )
        })?;

        // All plans resolve before the first page is decoded, so an
        // unsupported column fails the read up front.
        let num_columns = schema.num_columns();
        let mut plans = Vec::with_capacity(num_columns);
        let mut builders = Vec::with_capacity(num_columns);
        for i in 0..num_columns {
            let descr = schema.column(i);
            let plan = column_plan(&descr, &self.options)?;
            let repeated = descr.max_rep_level() > 0;
            builders.push(ColumnBuilder::new(
                descr.name().to_owned(),
                output_type(&plan, repeated),
                declared_rows,
            ));
            plans.push(plan);
        }

        for group_idx in 0..reader.num_row_groups() {
            let row_group = reader.get_row_group(group_idx)?;
            for (column_idx, plan) in plans.iter().enumerate() {
                let column_reader = row_group.get_column_reader(column_idx)?;
                let descr = schema.column(column_idx);
                materialize_column(column_reader, &descr, plan, &mut builders[column_idx])?;
            }
        }

        for builder in &builders {
            if builder.len() != declared_rows {
                return Err(ParquetError::RowCountMismatch(format!(
                    "column {} materialized {} rows, file metadata declares {}",
                    builder.name(),
                    builder.len(),
                    declared_rows
                )));
            }
        }

        let columns = builders.into_iter().map(ColumnBuilder::finish).collect();
        Ok(Table::new(name, columns, declared_rows))
    }
}

/// Decodes one column chunk into its builder, dispatching on the plan
/// resolved for the column.
fn materialize_column(
    reader: ColumnReader,
    descr: &ColumnDescriptor,
    plan: &ColumnPlan,
    builder: &mut ColumnBuilder,
) -> Result<()> {
    match plan {
        ColumnPlan::Boolean => drain::<BoolType, _>(reader, descr, builder, |v| {
            Ok(CellValue::Boolean(*v))
        }),
        ColumnPlan::Int32(kind) => {
            drain::<Int32Type, _>(reader, descr, builder, |v| kind.convert(*v))
        }
        ColumnPlan::Int64(kind) => {
            drain::<Int64Type, _>(reader, descr, builder, |v| kind.convert(*v))
        }
        ColumnPlan::Int96(kind) => {
            drain::<Int96Type, _>(reader, descr, builder, |v| kind.convert(v))
        }
        ColumnPlan::Float => drain::<FloatType, _>(reader, descr, builder, |v| {
            Ok(CellValue::Float(*v))
        }),
        ColumnPlan::Double => drain::<DoubleType, _>(reader, descr, builder, |v| {
            Ok(CellValue::Double(*v))
        }),
        ColumnPlan::ByteArray(kind) => drain::<ByteArrayType, _>(reader, descr, builder, |v| {
            Ok(kind.convert(v.data()))
        }),
        ColumnPlan::FixedLenByteArray(kind) => {
            drain::<FixedLenByteArrayType, _>(reader, descr, builder, |v| Ok(kind.convert(v.data())))
        }
    }
}

/// Reads a whole column chunk batch by batch, appending one cell per logical
/// row.
///
/// Levels drive the loop: for flat columns every level is a row, while for a
/// repeated leaf a repetition level of zero closes the previous row. The
/// items of a repeated row carry across batches, so a row spanning pages
/// still renders into a single cell.
fn drain<T: DataType, F>(
    reader: ColumnReader,
    descr: &ColumnDescriptor,
    builder: &mut ColumnBuilder,
    convert: F,
) -> Result<()>
where
    F: Fn(&T::T) -> Result<CellValue>,
{
    let mut reader = get_typed_column_reader::<T>(reader);
    let max_def_level = descr.max_def_level();
    let max_rep_level = descr.max_rep_level();

    let mut values: Vec<T::T> = Vec::new();
    let mut def_levels: Vec<i16> = Vec::new();
    let mut rep_levels: Vec<i16> = Vec::new();
    let mut open_row: Option<Vec<CellValue>> = None;

    loop {
        values.clear();
        def_levels.clear();
        rep_levels.clear();
        let (_, values_read, levels_read) = reader.read_records(
            READ_BATCH_SIZE,
            (max_def_level > 0).then_some(&mut def_levels),
            (max_rep_level > 0).then_some(&mut rep_levels),
            &mut values,
        )?;
        if values_read == 0 && levels_read == 0 {
            break;
        }

        if max_rep_level > 0 {
            let mut value_idx = 0;
            for level_idx in 0..levels_read {
                if rep_levels[level_idx] == 0 {
                    if let Some(items) = open_row.take() {
                        append_rendered(builder, items)?;
                    }
                    open_row = Some(Vec::new());
                }
                let items = open_row
                    .as_mut()
                    .ok_or_else(|| general_err!("column chunk starts inside a repeated value"))?;
                if def_levels[level_idx] == max_def_level {
                    items.push(convert(&values[value_idx])?);
                    value_idx += 1;
                }
            }
        } else if max_def_level > 0 {
            let mut value_idx = 0;
            for level_idx in 0..levels_read {
                if def_levels[level_idx] == max_def_level {
                    builder.append_value(convert(&values[value_idx])?)?;
                    value_idx += 1;
                } else {
                    builder.append_missing();
                }
            }
        } else {
            for value in &values[..values_read] {
                builder.append_value(convert(value)?)?;
            }
        }
    }

    if let Some(items) = open_row.take() {
        append_rendered(builder, items)?;
    }
    Ok(())
}

/// Closes a repeated row, rendering its items into one text cell.
fn append_rendered(builder: &mut ColumnBuilder, items: Vec<CellValue>) -> Result<()> {
    if items.is_empty() {
        // A single-level repeated field cannot distinguish an empty list from
        // an absent one; both arrive as a zero definition level.
        builder.append_missing();
        return Ok(());
    }
    let rendered: Vec<String> = items.iter().map(CellValue::render).collect();
    builder.append_value(CellValue::String(format!("[{}]", rendered.join(", "))))
}
