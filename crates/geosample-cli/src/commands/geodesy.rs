//! Geodesy utility commands

use crate::cli::{DestinationArgs, DistanceArgs, PolylineArgs, TileArgs};
use crate::output::OutputWriter;
use crate::output_types::{
    DestinationOutput, DistanceOutput, PolylineOutput, PolylineVertex, TileOutput,
};
use anyhow::{Context, Result};
use geosample_core::geodesy::{self, polyline};
use geosample_core::models::GeoPoint;

pub fn distance(args: DistanceArgs, output: &OutputWriter) -> Result<()> {
    let from = GeoPoint::new(args.from_lat, args.from_lon).context("Invalid start point")?;
    let to = GeoPoint::new(args.to_lat, args.to_lon).context("Invalid end point")?;

    let result = DistanceOutput {
        distance_m: geodesy::distance(&from, &to)?,
        initial_bearing_deg: geodesy::bearing_to(&from, &to),
    };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.kv("Distance", format!("{:.3} m", result.distance_m));
        output.kv("Initial bearing", format!("{:.4}°", result.initial_bearing_deg));
    }
    Ok(())
}

pub fn destination(args: DestinationArgs, output: &OutputWriter) -> Result<()> {
    let origin = GeoPoint::new(args.lat, args.lon).context("Invalid origin")?;
    let point = geodesy::destination(&origin, args.bearing, args.distance)?;
    let result = DestinationOutput { lat: point.lat(), lon: point.lon() };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.kv("Destination", point);
    }
    Ok(())
}

pub fn tile(args: TileArgs, output: &OutputWriter) -> Result<()> {
    let point = GeoPoint::new(args.lat, args.lon).context("Invalid point")?;
    let tile = geodesy::degree_to_tile(&point, args.zoom)?;
    let (north, west) = geodesy::tile_to_degree(&tile)?;

    let result = TileOutput { x: tile.x, y: tile.y, zoom: tile.zoom, north_west: [north, west] };

    if output.is_json() {
        output.result(result)?;
    } else {
        output.kv("Tile", format!("{}/{}/{}", tile.zoom, tile.x, tile.y));
        output.kv("North-west corner", format!("({:.8}, {:.8})", north, west));
    }
    Ok(())
}

pub fn polyline(args: PolylineArgs, output: &OutputWriter) -> Result<()> {
    let points = polyline::decode(&args.encoded).context("Failed to decode polyline")?;

    let vertices: Vec<PolylineVertex> = points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let perpendicular_deg = if args.perpendicular && index > 0 {
                points
                    .get(index + 1)
                    .map(|next| geodesy::perpendicular_bearing(&points[index - 1], point, next))
            } else {
                None
            };
            PolylineVertex { index, lat: point.lat(), lon: point.lon(), perpendicular_deg }
        })
        .collect();

    if output.is_json() {
        output.result(PolylineOutput { points: vertices })?;
    } else {
        output.info(format!("Decoded {} points", vertices.len()));
        output.table(vertices);
    }
    Ok(())
}
