use lakescan_core::io::{write_geotiff_to_buffer};
use lakescan_core::raster::{GeoTransform, Raster};
use std::io::Write;

#[test]
fn dump() {
    let mut raster: Raster<f32> = Raster::new(8, 12);
    raster.set_transform(GeoTransform::new(500_000.0, 4_600_000.0, 60.0, -60.0));
    raster.set_nodata(Some(-9999.0));
    let buf = write_geotiff_to_buffer(&raster, None).unwrap();
    let mut f = std::fs::File::create("/tmp/out.tif").unwrap();
    f.write_all(&buf).unwrap();
    eprintln!("DBGLEN {}", buf.len());
}
