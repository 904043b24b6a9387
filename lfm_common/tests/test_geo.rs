/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use uom::si::length::nautical_mile;
use lfm_common::geo::*;

// run with "cargo test -p lfm_common --test test_geo -- --nocapture"

const EPS: f64 = 0.01;

fn loc (lat: f64, lon: f64) -> Location { Location::new( lat, lon).unwrap() }

#[test]
fn test_bearing_same_location() {
    for (lat,lon) in [(0.0,0.0), (50.15,8.3166667), (-33.9,151.2), (89.0,-179.0)] {
        let p = loc( lat, lon);
        let b = p.bearing_to( &p);
        println!("{p} -> {p} : {b}");
        assert_eq!( b, 0.0);
    }
}

#[test]
fn test_bearing_cardinal_directions() {
    let origin = loc( 0.0, 0.0);

    for (target, expected) in [(loc(1.0,0.0), 0.0), (loc(0.0,1.0), 90.0), (loc(-1.0,0.0), 180.0), (loc(0.0,-1.0), 270.0)] {
        let b = origin.bearing_to( &target);
        println!("{origin} -> {target} : {b}");
        assert!( (b - expected).abs() < EPS);
    }
}

#[test]
fn test_bearing_range() {
    let center = loc( 50.15, 8.3166667);
    let b = center.bearing_to( &loc( 50.0, 8.0)); // south west of center
    println!("bearing SW: {b}");
    assert!( b > 180.0 && b < 270.0);
}

#[test]
fn test_location_validation() {
    assert!( Location::new( 91.0, 0.0).is_err());
    assert!( Location::new( 0.0, -180.5).is_err());
    assert!( Location::new( -90.0, 180.0).is_ok());

    let p: Location = serde_json::from_str( r#"{"lat": 37.0, "lon": -122.0}"#).unwrap();
    assert_eq!( p, loc( 37.0, -122.0));
}

#[test]
fn test_bbox_center_radius_round_trip() {
    for (lat,lon,r) in [(50.15,8.3166667,50.0), (0.0,0.0,10.0), (-45.0,170.0,120.0), (60.0,-20.0,5.0)] {
        let center = loc( lat, lon);
        let bbox = BoundingBox::from_center_and_radius( &center, nautical_miles(r)).unwrap();
        let (c, radius) = bbox.to_center_and_radius();
        println!("{center} r={r}nm -> {bbox} -> {c} r={}nm", radius.get::<nautical_mile>());

        assert!( (c.latitude - lat).abs() < 1e-6);
        assert!( (c.longitude - lon).abs() < 1e-6);
        assert!( (radius.get::<nautical_mile>() - r).abs() < 1e-6);
        assert!( bbox.validate().is_ok());
    }
}

#[test]
fn test_bbox_latitude_skew() {
    let center = loc( 60.0, 10.0);
    let bbox = BoundingBox::from_center_and_radius( &center, nautical_miles(60.0)).unwrap();
    println!("bbox at 60deg: {bbox}");

    assert!( (bbox.max_lat - bbox.min_lat - 2.0).abs() < 1e-9);
    assert!( (bbox.max_lon - bbox.min_lon - 4.0).abs() < 1e-6); // cos(60) == 0.5
}

#[test]
fn test_bbox_clamping() {
    let bbox = BoundingBox::from_center_and_radius( &loc( 89.0, 179.5), nautical_miles(120.0)).unwrap();
    println!("clamped: {bbox}");
    assert_eq!( bbox.max_lat, 90.0);
    assert_eq!( bbox.max_lon, 180.0);
    assert!( bbox.max_lon - bbox.min_lon <= 360.0);
}

#[test]
fn test_bbox_invalid_input() {
    let res = BoundingBox::from_center_and_radius( &loc( 89.95, 0.0), nautical_miles(10.0));
    println!("near pole: {res:?}");
    assert!( matches!( res, Err(GeoError::PoleProximity(_))));

    let res = BoundingBox::from_center_and_radius( &loc( -89.95, 0.0), nautical_miles(10.0));
    assert!( matches!( res, Err(GeoError::PoleProximity(_))));

    let res = BoundingBox::from_center_and_radius( &loc( 10.0, 0.0), nautical_miles(-1.0));
    assert!( matches!( res, Err(GeoError::InvalidRadius(_))));

    // a zero radius would collapse the box to a point
    let res = BoundingBox::from_center_and_radius( &loc( 10.0, 0.0), nautical_miles(0.0));
    assert!( matches!( res, Err(GeoError::InvalidRadius(_))));

    assert!( matches!( BoundingBox::new( 10.0, 5.0, 0.0, 1.0), Err(GeoError::InvalidBounds(_))));
    assert!( matches!( BoundingBox::new( 0.0, 1.0, 3.0, 3.0), Err(GeoError::InvalidBounds(_))));
    assert!( matches!( BoundingBox::new( -91.0, 1.0, 0.0, 1.0), Err(GeoError::InvalidLatitude(_))));
    assert!( BoundingBox::new( 45.8, 47.8, 5.9, 10.5).is_ok());
}

#[test]
fn test_normalize_angles() {
    assert_eq!( normalize_180( 190.0), -170.0);
    assert_eq!( normalize_180( -190.0), 170.0);
    assert_eq!( normalize_180( 45.0), 45.0);
    assert_eq!( normalize_360( -90.0), 270.0);
    assert_eq!( normalize_360( 450.0), 90.0);
}
