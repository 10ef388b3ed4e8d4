//! Container layout: field names, Arrow schema and image-type metadata.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use pictor_types::ImageType;

use crate::error::DatasetError;

/// Rendered chart images.
pub const IMAGES: &str = "images";
/// High price of the window's last row.
pub const HIGH: &str = "high";
/// Low price of the window's last row.
pub const LOW: &str = "low";
/// Open price of the window's last row.
pub const OPEN: &str = "open";
/// Close price of the window's last row.
pub const CLOSE: &str = "close";
/// Volume of the window's last row.
pub const VOLUME: &str = "volume";
/// Moving average (window length) of the window's last row.
pub const MVG_AVERAGE: &str = "mvg_average";
/// Date of the window's last row.
pub const DATE: &str = "date";
/// Ticker the row belongs to.
pub const TICKER: &str = "ticker";

/// Every field, in container column order.
pub const FIELD_NAMES: [&str; 9] = [
    IMAGES,
    HIGH,
    LOW,
    OPEN,
    CLOSE,
    VOLUME,
    MVG_AVERAGE,
    DATE,
    TICKER,
];

/// Scalar metadata fields stored as `Float32`.
pub const SCALAR_FIELDS: [&str; 6] = [HIGH, LOW, OPEN, CLOSE, VOLUME, MVG_AVERAGE];

const META_IMAGE_TYPE: &str = "pictor.image_type";
const META_WINDOW_LENGTH: &str = "pictor.window_length";
const META_PIXEL_HEIGHT: &str = "pictor.pixel_height";
const META_IMAGE_SHAPE: &str = "pictor.image_shape";

/// Child field of the fixed-size image list.
#[must_use]
pub fn image_item_field() -> FieldRef {
    Arc::new(Field::new("item", DataType::Float32, false))
}

/// Flattened values per image, as the Arrow list size.
///
/// # Errors
/// [`DatasetError::Storage`] if an image does not fit an Arrow list.
pub fn image_list_size(image_type: &ImageType) -> Result<i32, DatasetError> {
    i32::try_from(image_type.image_len()).map_err(|_| {
        DatasetError::Storage(format!(
            "image type {} is too large for one list entry",
            image_type.name
        ))
    })
}

/// Arrow schema of a dataset rendered with `image_type`.
///
/// # Errors
/// [`DatasetError::Storage`] if the image size does not fit an Arrow list.
pub fn dataset_schema(image_type: &ImageType) -> Result<Schema, DatasetError> {
    let mut fields = vec![Field::new(
        IMAGES,
        DataType::FixedSizeList(image_item_field(), image_list_size(image_type)?),
        false,
    )];
    fields.extend(
        SCALAR_FIELDS
            .iter()
            .map(|name| Field::new(*name, DataType::Float32, false)),
    );
    fields.push(Field::new(DATE, DataType::Utf8, false));
    fields.push(Field::new(TICKER, DataType::Utf8, false));

    let (channels, height, width) = image_type.image_shape();
    let metadata = HashMap::from([
        (META_IMAGE_TYPE.to_string(), image_type.name.clone()),
        (
            META_WINDOW_LENGTH.to_string(),
            image_type.window_length.to_string(),
        ),
        (
            META_PIXEL_HEIGHT.to_string(),
            image_type.pixel_height.to_string(),
        ),
        (
            META_IMAGE_SHAPE.to_string(),
            format!("{channels},{height},{width}"),
        ),
    ]);

    Ok(Schema::new_with_metadata(fields, metadata))
}

/// Recovers the image type recorded in schema metadata.
///
/// # Errors
/// [`DatasetError::Storage`] when a key is missing or malformed.
pub fn image_type_from_metadata(
    metadata: &HashMap<String, String>,
) -> Result<ImageType, DatasetError> {
    let get = |key: &str| {
        metadata
            .get(key)
            .ok_or_else(|| DatasetError::Storage(format!("missing schema metadata '{key}'")))
    };
    let parse = |key: &str| -> Result<usize, DatasetError> {
        let value = get(key)?;
        value.parse().map_err(|_| {
            DatasetError::Storage(format!("invalid schema metadata {key}={value}"))
        })
    };

    Ok(ImageType::new(
        get(META_IMAGE_TYPE)?.clone(),
        parse(META_WINDOW_LENGTH)?,
        parse(META_PIXEL_HEIGHT)?,
    )?)
}
