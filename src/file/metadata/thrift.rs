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

//! Decoding of the thrift structures that make up the Parquet footer and the
//! per-page headers.

use std::sync::Arc;

use crate::basic::{
    Compression, ConvertedType, Encoding, LogicalType, PageType, Repetition, Type,
};
use crate::errors::{ParquetError, Result};
use crate::file::metadata::{
    ColumnChunkMetaData, FileMetaData, KeyValue, ParquetMetaData, RowGroupMetaData,
};
use crate::schema::types::{self, ColumnDescPtr, SchemaDescPtr, SchemaDescriptor};
use crate::thrift::{FieldType, ThriftCompactInputProtocol};

/// Mirror of the Parquet `SchemaElement` struct. The schema is flattened into a list
/// of these by a depth-first traversal, with `num_children` rebuilding the nesting.
pub(crate) struct SchemaElement<'a> {
    /// Physical type. Not set if the element is a non-leaf node.
    pub(crate) type_: Option<Type>,
    /// Byte length of the values if type is FIXED_LEN_BYTE_ARRAY.
    pub(crate) type_length: Option<i32>,
    /// Repetition of the field. The root of the schema does not have one.
    pub(crate) repetition_type: Option<Repetition>,
    /// Name of the field in the schema.
    pub(crate) name: &'a str,
    /// Number of nested fields. Not set when the element is a primitive type.
    pub(crate) num_children: Option<i32>,
    /// Original type annotation, superseded by `logical_type`.
    pub(crate) converted_type: Option<ConvertedType>,
    /// Legacy decimal scale, superseded by the Decimal logical type.
    pub(crate) scale: Option<i32>,
    /// Legacy decimal precision, superseded by the Decimal logical type.
    pub(crate) precision: Option<i32>,
    /// Field id from the original schema when that schema supports ids.
    pub(crate) field_id: Option<i32>,
    /// The logical type of this element.
    pub(crate) logical_type: Option<LogicalType>,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for SchemaElement<'a> {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut type_: Option<Type> = None;
        let mut type_length: Option<i32> = None;
        let mut repetition_type: Option<Repetition> = None;
        let mut name: Option<&str> = None;
        let mut num_children: Option<i32> = None;
        let mut converted_type: Option<ConvertedType> = None;
        let mut scale: Option<i32> = None;
        let mut precision: Option<i32> = None;
        let mut field_id: Option<i32> = None;
        let mut logical_type: Option<LogicalType> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => type_ = Some(Type::try_from(&mut *prot)?),
                2 => type_length = Some(prot.read_i32()?),
                3 => repetition_type = Some(Repetition::try_from(&mut *prot)?),
                4 => name = Some(prot.read_string()?),
                5 => num_children = Some(prot.read_i32()?),
                6 => converted_type = Some(ConvertedType::try_from(&mut *prot)?),
                7 => scale = Some(prot.read_i32()?),
                8 => precision = Some(prot.read_i32()?),
                9 => field_id = Some(prot.read_i32()?),
                10 => logical_type = Some(LogicalType::try_from(&mut *prot)?),
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let name = name.ok_or_else(|| general_err!("Required field name is missing"))?;
        Ok(SchemaElement {
            type_,
            type_length,
            repetition_type,
            name,
            num_children,
            converted_type,
            scale,
            precision,
            field_id,
            logical_type,
        })
    }
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for KeyValue {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut key: Option<String> = None;
        let mut value: Option<String> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => key = Some(prot.read_string()?.to_owned()),
                2 => value = Some(prot.read_string()?.to_owned()),
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let key = key.ok_or_else(|| general_err!("Required field key is missing"))?;
        Ok(KeyValue { key, value })
    }
}

// mask values for the required fields of ColumnMetaData, keyed by field id
const COL_META_TYPE: u16 = 1 << 1;
const COL_META_ENCODINGS: u16 = 1 << 2;
const COL_META_CODEC: u16 = 1 << 4;
const COL_META_NUM_VALUES: u16 = 1 << 5;
const COL_META_TOTAL_UNCOMP_SZ: u16 = 1 << 6;
const COL_META_TOTAL_COMP_SZ: u16 = 1 << 7;
const COL_META_DATA_PAGE_OFFSET: u16 = 1 << 9;

// a mask where all required fields' bits are set
const COL_META_ALL_REQUIRED: u16 = COL_META_TYPE
    | COL_META_ENCODINGS
    | COL_META_CODEC
    | COL_META_NUM_VALUES
    | COL_META_TOTAL_UNCOMP_SZ
    | COL_META_TOTAL_COMP_SZ
    | COL_META_DATA_PAGE_OFFSET;

// check mask to see if all required fields are set. return an appropriate error if
// any are missing.
fn validate_column_metadata(mask: u16) -> Result<()> {
    if mask != COL_META_ALL_REQUIRED {
        if mask & COL_META_ENCODINGS == 0 {
            return Err(general_err!("Required field encodings is missing"));
        }
        if mask & COL_META_CODEC == 0 {
            return Err(general_err!("Required field codec is missing"));
        }
        if mask & COL_META_NUM_VALUES == 0 {
            return Err(general_err!("Required field num_values is missing"));
        }
        if mask & COL_META_TOTAL_UNCOMP_SZ == 0 {
            return Err(general_err!(
                "Required field total_uncompressed_size is missing"
            ));
        }
        if mask & COL_META_TOTAL_COMP_SZ == 0 {
            return Err(general_err!(
                "Required field total_compressed_size is missing"
            ));
        }
        if mask & COL_META_DATA_PAGE_OFFSET == 0 {
            return Err(general_err!("Required field data_page_offset is missing"));
        }
    }

    Ok(())
}

// Decode `ColumnMetaData`. Returns a mask of all required fields that were observed,
// which can be passed to `validate_column_metadata`.
fn read_column_metadata(
    prot: &mut ThriftCompactInputProtocol<'_>,
    column: &mut ColumnChunkMetaData,
) -> Result<u16> {
    let mut seen_mask = 0u16;

    // struct ColumnMetaData {
    //   1: required Type type
    //   2: required list<Encoding> encodings
    //   3: required list<string> path_in_schema
    //   4: required CompressionCodec codec
    //   5: required i64 num_values
    //   6: required i64 total_uncompressed_size
    //   7: required i64 total_compressed_size
    //   8: optional list<KeyValue> key_value_metadata
    //   9: required i64 data_page_offset
    //   10: optional i64 index_page_offset
    //   11: optional i64 dictionary_page_offset
    //   12: optional Statistics statistics;
    //   ...
    // }
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            // 1: type is never used, we can use the column descriptor
            1 => {
                // read for error handling
                Type::try_from(&mut *prot)?;
                seen_mask |= COL_META_TYPE;
            }
            2 => {
                column.encodings = Vec::<Encoding>::try_from(&mut *prot)?;
                seen_mask |= COL_META_ENCODINGS;
            }
            // 3: path_in_schema is redundant
            4 => {
                column.compression = Compression::try_from(&mut *prot)?;
                seen_mask |= COL_META_CODEC;
            }
            5 => {
                column.num_values = prot.read_i64()?;
                seen_mask |= COL_META_NUM_VALUES;
            }
            6 => {
                column.total_uncompressed_size = prot.read_i64()?;
                seen_mask |= COL_META_TOTAL_UNCOMP_SZ;
            }
            7 => {
                column.total_compressed_size = prot.read_i64()?;
                seen_mask |= COL_META_TOTAL_COMP_SZ;
            }
            9 => {
                column.data_page_offset = prot.read_i64()?;
                seen_mask |= COL_META_DATA_PAGE_OFFSET;
            }
            10 => {
                column.index_page_offset = Some(prot.read_i64()?);
            }
            11 => {
                column.dictionary_page_offset = Some(prot.read_i64()?);
            }
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;

    Ok(seen_mask)
}

fn read_column_chunk(
    prot: &mut ThriftCompactInputProtocol<'_>,
    column_descr: &ColumnDescPtr,
) -> Result<ColumnChunkMetaData> {
    // default initialized chunk, filled in from the embedded ColumnMetaData
    let mut col = ColumnChunkMetaData {
        column_descr: column_descr.clone(),
        encodings: Vec::new(),
        file_path: None,
        file_offset: 0,
        num_values: 0,
        compression: Compression::UNCOMPRESSED,
        total_compressed_size: 0,
        total_uncompressed_size: 0,
        data_page_offset: 0,
        index_page_offset: None,
        dictionary_page_offset: None,
    };

    // seen flag for file_offset
    let mut has_file_offset = false;

    // mask of seen flags for ColumnMetaData
    let mut col_meta_mask = 0u16;

    // struct ColumnChunk {
    //   1: optional string file_path
    //   2: required i64 file_offset = 0
    //   3: optional ColumnMetaData meta_data
    //   4: optional i64 offset_index_offset
    //   5: optional i32 offset_index_length
    //   6: optional i64 column_index_offset
    //   7: optional i32 column_index_length
    //   ...
    // }
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => {
                col.file_path = Some(prot.read_string()?.to_owned());
            }
            2 => {
                col.file_offset = prot.read_i64()?;
                has_file_offset = true;
            }
            3 => {
                col_meta_mask = read_column_metadata(&mut *prot, &mut col)?;
            }
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;

    // the only required field from ColumnChunk
    if !has_file_offset {
        return Err(general_err!("Required field file_offset is missing"));
    }

    validate_column_metadata(col_meta_mask)?;

    Ok(col)
}

fn read_row_group(
    prot: &mut ThriftCompactInputProtocol<'_>,
    schema_descr: &SchemaDescPtr,
) -> Result<RowGroupMetaData> {
    let mut row_group = RowGroupMetaData {
        columns: Vec::new(),
        num_rows: 0,
        total_byte_size: 0,
        schema_descr: schema_descr.clone(),
    };

    // mask values for required fields
    const RG_COLUMNS: u8 = 1 << 1;
    const RG_TOT_BYTE_SIZE: u8 = 1 << 2;
    const RG_NUM_ROWS: u8 = 1 << 3;
    const RG_ALL_REQUIRED: u8 = RG_COLUMNS | RG_TOT_BYTE_SIZE | RG_NUM_ROWS;

    let mut mask = 0u8;

    // struct RowGroup {
    //   1: required list<ColumnChunk> columns
    //   2: required i64 total_byte_size
    //   3: required i64 num_rows
    //   4: optional list<SortingColumn> sorting_columns
    //   5: optional i64 file_offset
    //   6: optional i64 total_compressed_size
    //   7: optional i16 ordinal
    // }
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => {
                let list_ident = prot.read_list_begin()?;
                if schema_descr.num_columns() != list_ident.size as usize {
                    return Err(general_err!(
                        "Column count mismatch. Schema has {} columns while Row Group has {}",
                        schema_descr.num_columns(),
                        list_ident.size
                    ));
                }
                for i in 0..list_ident.size as usize {
                    let col = read_column_chunk(prot, &schema_descr.columns()[i])?;
                    row_group.columns.push(col);
                }
                mask |= RG_COLUMNS;
            }
            2 => {
                row_group.total_byte_size = prot.read_i64()?;
                mask |= RG_TOT_BYTE_SIZE;
            }
            3 => {
                row_group.num_rows = prot.read_i64()?;
                mask |= RG_NUM_ROWS;
            }
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;

    if mask != RG_ALL_REQUIRED {
        if mask & RG_COLUMNS == 0 {
            return Err(general_err!("Required field columns is missing"));
        }
        if mask & RG_TOT_BYTE_SIZE == 0 {
            return Err(general_err!("Required field total_byte_size is missing"));
        }
        if mask & RG_NUM_ROWS == 0 {
            return Err(general_err!("Required field num_rows is missing"));
        }
    }

    Ok(row_group)
}

/// Create [`ParquetMetaData`] from thrift input. Note that this only decodes the file
/// metadata in the Parquet footer; the input must span the full metadata block.
pub(crate) fn parquet_metadata_from_bytes(buf: &[u8]) -> Result<ParquetMetaData> {
    let mut prot = ThriftCompactInputProtocol::new(buf);

    let mut version: Option<i32> = None;
    let mut num_rows: Option<i64> = None;
    let mut row_groups: Option<Vec<RowGroupMetaData>> = None;
    let mut key_value_metadata: Option<Vec<KeyValue>> = None;
    let mut created_by: Option<&str> = None;

    // this will need to be set before parsing row groups
    let mut schema_descr: Option<SchemaDescPtr> = None;

    // struct FileMetaData {
    //   1: required i32 version
    //   2: required list<SchemaElement> schema;
    //   3: required i64 num_rows
    //   4: required list<RowGroup> row_groups
    //   5: optional list<KeyValue> key_value_metadata
    //   6: optional string created_by
    //   7: optional list<ColumnOrder> column_orders;
    //   8: optional EncryptionAlgorithm encryption_algorithm
    //   9: optional binary footer_signing_key_metadata
    // }
    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            1 => {
                version = Some(prot.read_i32()?);
            }
            2 => {
                // read schema and convert to SchemaDescriptor for use when reading row groups
                let elements = Vec::<SchemaElement>::try_from(&mut prot)?;
                let root = types::from_thrift(&elements)?;
                schema_descr = Some(Arc::new(SchemaDescriptor::new(root)));
            }
            3 => {
                num_rows = Some(prot.read_i64()?);
            }
            4 => {
                let Some(schema_descr) = schema_descr.as_ref() else {
                    return Err(general_err!("Required field schema is missing"));
                };
                let list_ident = prot.read_list_begin()?;
                // each row group takes at least one byte of input
                let cap = (list_ident.size as usize).min(prot.as_slice().len());
                let mut rg_vec = Vec::with_capacity(cap);
                for _ in 0..list_ident.size {
                    rg_vec.push(read_row_group(&mut prot, schema_descr)?);
                }
                row_groups = Some(rg_vec);
            }
            5 => {
                key_value_metadata = Some(Vec::<KeyValue>::try_from(&mut prot)?);
            }
            6 => {
                created_by = Some(prot.read_string()?);
            }
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    prot.read_struct_end()?;

    let Some(version) = version else {
        return Err(general_err!("Required field version is missing"));
    };
    let Some(num_rows) = num_rows else {
        return Err(general_err!("Required field num_rows is missing"));
    };
    let Some(row_groups) = row_groups else {
        return Err(general_err!("Required field row_groups is missing"));
    };
    let Some(schema_descr) = schema_descr else {
        return Err(general_err!("Required field schema is missing"));
    };

    if version != 1 && version != 2 {
        return Err(ParquetError::UnsupportedSchemaVersion(version));
    }

    let created_by = created_by.map(|c| c.to_owned());

    let fmd = FileMetaData::new(
        version,
        num_rows,
        created_by,
        key_value_metadata,
        schema_descr,
    );

    Ok(ParquetMetaData::new(fmd, row_groups))
}

/// Create a [`SchemaDescriptor`] from thrift input. The input must span the full
/// metadata block of a Parquet footer.
pub(crate) fn parquet_schema_from_bytes(buf: &[u8]) -> Result<SchemaDescriptor> {
    let mut prot = ThriftCompactInputProtocol::new(buf);

    prot.read_struct_begin()?;
    loop {
        let field_ident = prot.read_field_begin()?;
        if field_ident.field_type == FieldType::Stop {
            break;
        }
        match field_ident.id {
            2 => {
                let elements = Vec::<SchemaElement>::try_from(&mut prot)?;
                let root = types::from_thrift(&elements)?;
                return Ok(SchemaDescriptor::new(root));
            }
            _ => prot.skip(field_ident.field_type)?,
        }
    }
    Err(general_err!("Input does not contain a schema"))
}

// ----------------------------------------------------------------------
// Page headers

/// Header for an index page. Index pages carry no payload this crate reads, but the
/// header must still be consumed to advance past it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct IndexPageHeader {}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for IndexPageHeader {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            prot.skip(field_ident.field_type)?;
        }
        prot.read_struct_end()?;
        Ok(IndexPageHeader {})
    }
}

/// Header for a dictionary page.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DictionaryPageHeader {
    /// Number of values in the dictionary.
    pub(crate) num_values: i32,
    /// Encoding using this dictionary page.
    pub(crate) encoding: Encoding,
    /// If true, the entries in the dictionary are sorted in ascending order.
    pub(crate) is_sorted: Option<bool>,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for DictionaryPageHeader {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut num_values: Option<i32> = None;
        let mut encoding: Option<Encoding> = None;
        let mut is_sorted: Option<bool> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => num_values = Some(prot.read_i32()?),
                2 => encoding = Some(Encoding::try_from(&mut *prot)?),
                3 => is_sorted = Some(prot.read_bool()?),
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let num_values =
            num_values.ok_or_else(|| general_err!("Required field num_values is missing"))?;
        let encoding =
            encoding.ok_or_else(|| general_err!("Required field encoding is missing"))?;
        Ok(DictionaryPageHeader {
            num_values,
            encoding,
            is_sorted,
        })
    }
}

/// Header for a v1 data page. Page statistics are not decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DataPageHeader {
    /// Number of values in the page, including nulls.
    pub(crate) num_values: i32,
    /// Encoding of the values.
    pub(crate) encoding: Encoding,
    /// Encoding of the definition levels.
    pub(crate) definition_level_encoding: Encoding,
    /// Encoding of the repetition levels.
    pub(crate) repetition_level_encoding: Encoding,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for DataPageHeader {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut num_values: Option<i32> = None;
        let mut encoding: Option<Encoding> = None;
        let mut definition_level_encoding: Option<Encoding> = None;
        let mut repetition_level_encoding: Option<Encoding> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => num_values = Some(prot.read_i32()?),
                2 => encoding = Some(Encoding::try_from(&mut *prot)?),
                3 => definition_level_encoding = Some(Encoding::try_from(&mut *prot)?),
                4 => repetition_level_encoding = Some(Encoding::try_from(&mut *prot)?),
                // 5: statistics are not read
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let num_values =
            num_values.ok_or_else(|| general_err!("Required field num_values is missing"))?;
        let encoding =
            encoding.ok_or_else(|| general_err!("Required field encoding is missing"))?;
        let definition_level_encoding = definition_level_encoding
            .ok_or_else(|| general_err!("Required field definition_level_encoding is missing"))?;
        let repetition_level_encoding = repetition_level_encoding
            .ok_or_else(|| general_err!("Required field repetition_level_encoding is missing"))?;
        Ok(DataPageHeader {
            num_values,
            encoding,
            definition_level_encoding,
            repetition_level_encoding,
        })
    }
}

/// Header for a v2 data page. Page statistics are not decoded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct DataPageHeaderV2 {
    /// Number of values in the page, including nulls.
    pub(crate) num_values: i32,
    /// Number of null values in the page.
    pub(crate) num_nulls: i32,
    /// Number of rows in the page.
    pub(crate) num_rows: i32,
    /// Encoding of the values.
    pub(crate) encoding: Encoding,
    /// Length of the definition levels run, stored uncompressed before the values.
    pub(crate) definition_levels_byte_length: i32,
    /// Length of the repetition levels run, stored uncompressed before the values.
    pub(crate) repetition_levels_byte_length: i32,
    /// Whether the values section is compressed. Defaults to true when absent.
    pub(crate) is_compressed: bool,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for DataPageHeaderV2 {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut num_values: Option<i32> = None;
        let mut num_nulls: Option<i32> = None;
        let mut num_rows: Option<i32> = None;
        let mut encoding: Option<Encoding> = None;
        let mut definition_levels_byte_length: Option<i32> = None;
        let mut repetition_levels_byte_length: Option<i32> = None;
        let mut is_compressed: Option<bool> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => num_values = Some(prot.read_i32()?),
                2 => num_nulls = Some(prot.read_i32()?),
                3 => num_rows = Some(prot.read_i32()?),
                4 => encoding = Some(Encoding::try_from(&mut *prot)?),
                5 => definition_levels_byte_length = Some(prot.read_i32()?),
                6 => repetition_levels_byte_length = Some(prot.read_i32()?),
                7 => is_compressed = Some(prot.read_bool()?),
                // 8: statistics are not read
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let num_values =
            num_values.ok_or_else(|| general_err!("Required field num_values is missing"))?;
        let num_nulls =
            num_nulls.ok_or_else(|| general_err!("Required field num_nulls is missing"))?;
        let num_rows = num_rows.ok_or_else(|| general_err!("Required field num_rows is missing"))?;
        let encoding =
            encoding.ok_or_else(|| general_err!("Required field encoding is missing"))?;
        let definition_levels_byte_length = definition_levels_byte_length.ok_or_else(|| {
            general_err!("Required field definition_levels_byte_length is missing")
        })?;
        let repetition_levels_byte_length = repetition_levels_byte_length.ok_or_else(|| {
            general_err!("Required field repetition_levels_byte_length is missing")
        })?;
        Ok(DataPageHeaderV2 {
            num_values,
            num_nulls,
            num_rows,
            encoding,
            definition_levels_byte_length,
            repetition_levels_byte_length,
            is_compressed: is_compressed.unwrap_or(true),
        })
    }
}

/// Common header prefixed to every page. Exactly one of the `*_header` fields is set,
/// matching `type_`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PageHeader {
    /// The type of the page, indicating which of the `*_header` fields is set.
    pub(crate) type_: PageType,
    /// Uncompressed page size in bytes, not including this header.
    pub(crate) uncompressed_page_size: i32,
    /// Compressed page size in bytes, not including this header.
    pub(crate) compressed_page_size: i32,
    /// Optional 32-bit CRC checksum of the page payload.
    pub(crate) crc: Option<i32>,
    pub(crate) data_page_header: Option<DataPageHeader>,
    pub(crate) index_page_header: Option<IndexPageHeader>,
    pub(crate) dictionary_page_header: Option<DictionaryPageHeader>,
    pub(crate) data_page_header_v2: Option<DataPageHeaderV2>,
}

impl<'a> TryFrom<&mut ThriftCompactInputProtocol<'a>> for PageHeader {
    type Error = ParquetError;

    fn try_from(prot: &mut ThriftCompactInputProtocol<'a>) -> Result<Self> {
        let mut type_: Option<PageType> = None;
        let mut uncompressed_page_size: Option<i32> = None;
        let mut compressed_page_size: Option<i32> = None;
        let mut crc: Option<i32> = None;
        let mut data_page_header: Option<DataPageHeader> = None;
        let mut index_page_header: Option<IndexPageHeader> = None;
        let mut dictionary_page_header: Option<DictionaryPageHeader> = None;
        let mut data_page_header_v2: Option<DataPageHeaderV2> = None;
        prot.read_struct_begin()?;
        loop {
            let field_ident = prot.read_field_begin()?;
            if field_ident.field_type == FieldType::Stop {
                break;
            }
            match field_ident.id {
                1 => type_ = Some(PageType::try_from(&mut *prot)?),
                2 => uncompressed_page_size = Some(prot.read_i32()?),
                3 => compressed_page_size = Some(prot.read_i32()?),
                4 => crc = Some(prot.read_i32()?),
                5 => data_page_header = Some(DataPageHeader::try_from(&mut *prot)?),
                6 => index_page_header = Some(IndexPageHeader::try_from(&mut *prot)?),
                7 => dictionary_page_header = Some(DictionaryPageHeader::try_from(&mut *prot)?),
                8 => data_page_header_v2 = Some(DataPageHeaderV2::try_from(&mut *prot)?),
                _ => prot.skip(field_ident.field_type)?,
            }
        }
        prot.read_struct_end()?;
        let Some(type_) = type_ else {
            return Err(general_err!("Required field type_ is missing"));
        };
        let Some(uncompressed_page_size) = uncompressed_page_size else {
            return Err(general_err!(
                "Required field uncompressed_page_size is missing"
            ));
        };
        let Some(compressed_page_size) = compressed_page_size else {
            return Err(general_err!(
                "Required field compressed_page_size is missing"
            ));
        };
        Ok(PageHeader {
            type_,
            uncompressed_page_size,
            compressed_page_size,
            crc,
            data_page_header,
            index_page_header,
            dictionary_page_header,
            data_page_header_v2,
        })
    }
}
