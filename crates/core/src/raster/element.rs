//! Raster element trait for generic cell values

use crate::raster::DataType;
use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// The pixel data type tag for this element type
    fn data_type() -> DataType;

    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty, $dtype:expr) => {
        impl RasterElement for $t {
            fn data_type() -> DataType {
                $dtype
            }

            fn default_nodata() -> Self {
                <$t>::MIN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty, $dtype:expr) => {
        impl RasterElement for $t {
            fn data_type() -> DataType {
                $dtype
            }

            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

impl_raster_element_int!(i8, DataType::Int8);
impl_raster_element_int!(i16, DataType::Int16);
impl_raster_element_int!(i32, DataType::Int32);
impl_raster_element_int!(u8, DataType::UInt8);
impl_raster_element_int!(u16, DataType::UInt16);
impl_raster_element_int!(u32, DataType::UInt32);
impl_raster_element_float!(f32, DataType::Float32);
impl_raster_element_float!(f64, DataType::Float64);
