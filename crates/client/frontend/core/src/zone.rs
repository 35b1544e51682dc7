//! Mapping drop points to the zone a card was committed into.
//!
//! Resolution is a pure function of the point: it never looks at combat
//! state, so the same layout always answers the same way.

/// Position in scene space. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, offset: Offset) -> Point {
        Point::new(self.x + offset.dx, self.y + offset.dy)
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pointer travel since the touch began.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub dx: f32,
    pub dy: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude(self) -> f32 {
        self.dx.hypot(self.dy)
    }
}

/// Where a dragged card can land.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Zone {
    Strike,
    Influence,
    Sacrifice,
    /// The ritual circle; the card's own effect is played.
    Circle,
    /// Burned for effort; treated as a sacrifice.
    Burn,
    /// Outside every zone; the card returns to hand.
    #[default]
    None,
}

pub trait ZoneResolver {
    fn resolve(&self, point: Point) -> Zone;

    /// A point that resolves to `zone`, for placing labels or scripted drops.
    fn center_of(&self, _zone: Zone) -> Option<Point> {
        None
    }
}

impl<F> ZoneResolver for F
where
    F: Fn(Point) -> Zone,
{
    fn resolve(&self, point: Point) -> Zone {
        self(point)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ZoneError {
    #[error("zone boundary {0} is not a finite number")]
    NonFinite(f32),

    #[error("band starting at {0} is empty")]
    EmptyBand(f32),

    #[error("anchor radius {0} must be positive")]
    InvalidRadius(f32),
}

/// Horizontal bands stacked along the Y axis.
///
/// Each band covers `[start, next_start)`; the last one ends at `end`.
/// Bands never overlap and leave no gaps between the first start and `end`.
#[derive(Clone, Debug, PartialEq)]
pub struct YBandZones {
    bands: Vec<(f32, Zone)>,
    end: f32,
}

impl YBandZones {
    pub fn new(bands: impl IntoIterator<Item = (f32, Zone)>, end: f32) -> Result<Self, ZoneError> {
        let mut bands: Vec<(f32, Zone)> = bands.into_iter().collect();
        for &(start, _) in &bands {
            if !start.is_finite() {
                return Err(ZoneError::NonFinite(start));
            }
        }
        if !end.is_finite() {
            return Err(ZoneError::NonFinite(end));
        }
        bands.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut next_starts = bands.iter().skip(1).map(|band| band.0).chain([end]);
        for &(start, _) in &bands {
            let next = next_starts.next().unwrap_or(end);
            if next <= start {
                return Err(ZoneError::EmptyBand(start));
            }
        }

        Ok(Self { bands, end })
    }

    /// Card-commit layout: strike on top, then influence, then sacrifice,
    /// with the hand below.
    pub fn disposition_layout() -> Self {
        Self {
            bands: vec![
                (0.0, Zone::Strike),
                (200.0, Zone::Influence),
                (320.0, Zone::Sacrifice),
            ],
            end: 440.0,
        }
    }

    pub fn bands(&self) -> &[(f32, Zone)] {
        &self.bands
    }

    pub fn end(&self) -> f32 {
        self.end
    }
}

impl ZoneResolver for YBandZones {
    fn resolve(&self, point: Point) -> Zone {
        let y = point.y;
        if y.is_nan() || y >= self.end {
            return Zone::None;
        }
        let index = self.bands.partition_point(|(start, _)| *start <= y);
        match index.checked_sub(1) {
            Some(band) => self.bands[band].1,
            None => Zone::None,
        }
    }

    fn center_of(&self, zone: Zone) -> Option<Point> {
        let index = self.bands.iter().position(|(_, band)| *band == zone)?;
        let start = self.bands[index].0;
        let end = self.bands.get(index + 1).map_or(self.end, |band| band.0);
        Some(Point::new(0.0, start + (end - start) / 2.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub zone: Zone,
    pub center: Point,
    pub radius: f32,
}

/// Circular zones around named anchors; the nearest anchor containing the
/// point wins, earlier anchors on exact ties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RadialZones {
    anchors: Vec<Anchor>,
}

impl RadialZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, zone: Zone, center: Point, radius: f32) -> Result<Self, ZoneError> {
        if !center.x.is_finite() {
            return Err(ZoneError::NonFinite(center.x));
        }
        if !center.y.is_finite() {
            return Err(ZoneError::NonFinite(center.y));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ZoneError::InvalidRadius(radius));
        }
        self.anchors.push(Anchor {
            zone,
            center,
            radius,
        });
        Ok(self)
    }

    /// Ritual layout: the circle in the middle, strike and influence above
    /// it, the brazier below.
    pub fn ritual_layout() -> Self {
        Self {
            anchors: vec![
                Anchor {
                    zone: Zone::Circle,
                    center: Point::new(0.0, 0.0),
                    radius: 80.0,
                },
                Anchor {
                    zone: Zone::Strike,
                    center: Point::new(-160.0, -120.0),
                    radius: 60.0,
                },
                Anchor {
                    zone: Zone::Influence,
                    center: Point::new(160.0, -120.0),
                    radius: 60.0,
                },
                Anchor {
                    zone: Zone::Burn,
                    center: Point::new(0.0, 180.0),
                    radius: 50.0,
                },
            ],
        }
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }
}

impl ZoneResolver for RadialZones {
    fn resolve(&self, point: Point) -> Zone {
        let mut best: Option<(f32, Zone)> = None;
        for anchor in &self.anchors {
            let distance = point.distance(anchor.center);
            if distance.is_nan() || distance > anchor.radius {
                continue;
            }
            if best.is_none_or(|(closest, _)| distance < closest) {
                best = Some((distance, anchor.zone));
            }
        }
        best.map_or(Zone::None, |(_, zone)| zone)
    }

    fn center_of(&self, zone: Zone) -> Option<Point> {
        self.anchors
            .iter()
            .find(|anchor| anchor.zone == zone)
            .map(|anchor| anchor.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn band_starts_are_inclusive_and_ends_exclusive() {
        let zones = YBandZones::disposition_layout();
        assert_eq!(zones.resolve(Point::new(0.0, 0.0)), Zone::Strike);
        assert_eq!(zones.resolve(Point::new(0.0, 199.9)), Zone::Strike);
        assert_eq!(zones.resolve(Point::new(0.0, 200.0)), Zone::Influence);
        assert_eq!(zones.resolve(Point::new(0.0, 320.0)), Zone::Sacrifice);
        assert_eq!(zones.resolve(Point::new(0.0, 440.0)), Zone::None);
        assert_eq!(zones.resolve(Point::new(0.0, -1.0)), Zone::None);
        assert_eq!(zones.resolve(Point::new(0.0, f32::NAN)), Zone::None);
    }

    #[test]
    fn bands_are_sorted_and_validated() {
        let zones = YBandZones::new([(100.0, Zone::Sacrifice), (0.0, Zone::Strike)], 200.0)
            .expect("valid bands");
        assert_eq!(zones.bands()[0], (0.0, Zone::Strike));
        assert_eq!(zones.resolve(Point::new(5.0, 150.0)), Zone::Sacrifice);

        assert_eq!(
            YBandZones::new([(0.0, Zone::Strike), (0.0, Zone::Influence)], 10.0),
            Err(ZoneError::EmptyBand(0.0))
        );
        assert_eq!(
            YBandZones::new([(0.0, Zone::Strike)], f32::INFINITY),
            Err(ZoneError::NonFinite(f32::INFINITY))
        );
    }

    #[test]
    fn nearest_containing_anchor_wins() {
        let zones = RadialZones::new()
            .with_anchor(Zone::Strike, Point::new(0.0, 0.0), 10.0)
            .and_then(|zones| zones.with_anchor(Zone::Influence, Point::new(8.0, 0.0), 10.0))
            .expect("valid anchors");

        assert_eq!(zones.resolve(Point::new(1.0, 0.0)), Zone::Strike);
        assert_eq!(zones.resolve(Point::new(6.0, 0.0)), Zone::Influence);
        assert_eq!(zones.resolve(Point::new(4.0, 0.0)), Zone::Strike);
        assert_eq!(zones.resolve(Point::new(40.0, 0.0)), Zone::None);
        assert_eq!(zones.resolve(Point::new(f32::NAN, 0.0)), Zone::None);
    }

    #[test]
    fn rejects_degenerate_anchor() {
        assert_eq!(
            RadialZones::new().with_anchor(Zone::Burn, Point::ORIGIN, 0.0),
            Err(ZoneError::InvalidRadius(0.0))
        );
    }

    #[test]
    fn zone_centers_resolve_back_to_their_zone() {
        let bands = YBandZones::disposition_layout();
        assert_eq!(bands.center_of(Zone::Influence), Some(Point::new(0.0, 260.0)));
        assert_eq!(bands.center_of(Zone::Circle), None);

        let radial = RadialZones::ritual_layout();
        for zone in [Zone::Circle, Zone::Strike, Zone::Influence, Zone::Burn] {
            let center = radial.center_of(zone).expect("anchored zone");
            assert_eq!(radial.resolve(center), zone);
        }
    }

    #[test]
    fn closures_resolve_zones() {
        let left_strike = |point: Point| if point.x < 0.0 { Zone::Strike } else { Zone::None };
        assert_eq!(left_strike.resolve(Point::new(-1.0, 0.0)), Zone::Strike);
        assert_eq!(left_strike.resolve(Point::new(1.0, 0.0)), Zone::None);
    }

    proptest! {
        #[test]
        fn every_covered_point_hits_exactly_its_band(
            starts in prop::collection::btree_set(-500i32..500, 1..6),
            y in -600.0f32..600.0,
        ) {
            let end = starts.iter().max().copied().unwrap_or(0) + 50;
            let zones_in_order = [Zone::Strike, Zone::Influence, Zone::Sacrifice, Zone::Circle, Zone::Burn];
            let bands: Vec<(f32, Zone)> = starts
                .into_iter()
                .zip(zones_in_order)
                .map(|(start, zone)| (start as f32, zone))
                .collect();
            let zones = YBandZones::new(bands.clone(), end as f32).expect("disjoint bands");

            let expected = bands
                .iter()
                .enumerate()
                .find(|(index, (start, _))| {
                    let next = bands.get(index + 1).map_or(end as f32, |band| band.0);
                    *start <= y && y < next
                })
                .map_or(Zone::None, |(_, (_, zone))| *zone);

            prop_assert_eq!(zones.resolve(Point::new(0.0, y)), expected);
            prop_assert_eq!(zones.resolve(Point::new(123.0, y)), expected);
        }

        #[test]
        fn radial_resolution_is_deterministic(x in -300.0f32..300.0, y in -300.0f32..300.0) {
            let zones = RadialZones::ritual_layout();
            let point = Point::new(x, y);
            let zone = zones.resolve(point);
            prop_assert_eq!(zone, zones.resolve(point));
            if zone != Zone::None {
                prop_assert!(zones
                    .anchors()
                    .iter()
                    .any(|anchor| anchor.zone == zone && point.distance(anchor.center) <= anchor.radius));
            }
        }
    }
}
