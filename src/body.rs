use crate::error::{SolarError, SolarResult};
use std::collections::HashMap;

/// Lowest speed multiplier a body accepts
pub const MIN_SPEED: f64 = 0.0;
/// Highest speed multiplier a body accepts
pub const MAX_SPEED: f64 = 5.0;
/// Speed multiplier every body starts with
pub const DEFAULT_SPEED: f64 = 1.0;

/// Static description of a planet
#[derive(Clone, Debug, PartialEq)]
pub struct BodySpec {
    pub name: String,
    pub radius: f64,
    /// 24-bit RGB colour, `0xRRGGBB`
    pub color: u32,
    pub orbit_radius: f64,
}

impl BodySpec {
    pub fn new(name: impl Into<String>, radius: f64, color: u32, orbit_radius: f64) -> Self {
        BodySpec {
            name: name.into(),
            radius,
            color,
            orbit_radius,
        }
    }
}

/// Static description of the sun
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunSpec {
    pub radius: f64,
    pub color: u32,
}

impl Default for SunSpec {
    fn default() -> Self {
        SunSpec {
            radius: 10.0,
            color: 0xffdd00,
        }
    }
}

/// The eight planets, innermost first
pub fn default_planets() -> Vec<BodySpec> {
    vec![
        BodySpec::new("Mercury", 1.5, 0xaaaaaa, 20.0),
        BodySpec::new("Venus", 2.5, 0xffa500, 35.0),
        BodySpec::new("Earth", 2.8, 0x0000ff, 50.0),
        BodySpec::new("Mars", 2.0, 0xff4500, 65.0),
        BodySpec::new("Jupiter", 6.0, 0xd2b48c, 90.0),
        BodySpec::new("Saturn", 5.0, 0xf0e68c, 120.0),
        BodySpec::new("Uranus", 4.0, 0xadd8e6, 150.0),
        BodySpec::new("Neptune", 3.8, 0x00008b, 180.0),
    ]
}

/// Sun at the centre of the system. It spins but never orbits and ignores speed multipliers.
#[derive(Clone, Debug, PartialEq)]
pub struct Sun {
    pub radius: f64,
    pub color: u32,
    /// Accumulated rotation around the Y-axis
    pub(crate) rotation: f64,
}

impl Sun {
    pub fn rotation(&self) -> f64 {
        self.rotation
    }
}

/// An orbiting planet and its animation state
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    name: String,
    radius: f64,
    color: u32,
    orbit_radius: f64,
    /// Rotation of the body's mesh around its own Y-axis
    self_rotation: f64,
    /// Rotation of the body's pivot around the sun
    orbit_angle: f64,
    /// User-controlled multiplier in [MIN_SPEED, MAX_SPEED]
    speed: f64,
}

impl CelestialBody {
    fn from_spec(spec: BodySpec) -> SolarResult<Self> {
        if !(spec.radius.is_finite() && spec.radius > 0.0) {
            return Err(SolarError::InvalidRadius {
                name: spec.name,
                radius: spec.radius,
            });
        }
        if !(spec.orbit_radius.is_finite() && spec.orbit_radius > 0.0) {
            return Err(SolarError::InvalidOrbitRadius {
                name: spec.name,
                radius: spec.orbit_radius,
            });
        }

        Ok(CelestialBody {
            name: spec.name,
            radius: spec.radius,
            color: spec.color,
            orbit_radius: spec.orbit_radius,
            self_rotation: 0.0,
            orbit_angle: 0.0,
            speed: DEFAULT_SPEED,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn orbit_radius(&self) -> f64 {
        self.orbit_radius
    }

    pub fn self_rotation(&self) -> f64 {
        self.self_rotation
    }

    pub fn orbit_angle(&self) -> f64 {
        self.orbit_angle
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Sets the speed multiplier, rejecting anything outside [0, 5] (NaN included)
    pub fn set_speed(&mut self, speed: f64) -> SolarResult<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(SolarError::SpeedOutOfRange(speed));
        }
        self.speed = speed;
        Ok(())
    }

    /// Adds the given deltas to the rotation and orbit angles
    pub(crate) fn rotate(&mut self, self_delta: f64, orbit_delta: f64) {
        self.self_rotation += self_delta;
        self.orbit_angle += orbit_delta;
    }
}

/// Ordered collection of the sun and every planet.
///
/// Bodies are kept in declaration order, which is also the order of the
/// control panel sliders. Names are unique and fixed once the registry exists.
#[derive(Clone, Debug)]
pub struct Registry {
    sun: Sun,
    bodies: Vec<CelestialBody>,
    index: HashMap<String, usize>,
}

impl Registry {
    /// Builds one body per spec, in order, validating radii and name uniqueness
    pub fn initialize<I>(sun: SunSpec, specs: I) -> SolarResult<Self>
    where
        I: IntoIterator<Item = BodySpec>,
    {
        if !(sun.radius.is_finite() && sun.radius > 0.0) {
            return Err(SolarError::InvalidRadius {
                name: "Sun".to_string(),
                radius: sun.radius,
            });
        }

        let mut bodies = Vec::new();
        let mut index = HashMap::new();
        for spec in specs {
            if index.contains_key(&spec.name) {
                return Err(SolarError::DuplicateName(spec.name));
            }
            let body = CelestialBody::from_spec(spec)?;
            index.insert(body.name.clone(), bodies.len());
            bodies.push(body);
        }

        log::debug!("registry initialized with {} bodies", bodies.len());

        Ok(Registry {
            sun: Sun {
                radius: sun.radius,
                color: sun.color,
                rotation: 0.0,
            },
            bodies,
            index,
        })
    }

    /// The default sun and eight planets
    pub fn solar_system() -> SolarResult<Self> {
        Self::initialize(SunSpec::default(), default_planets())
    }

    pub fn sun(&self) -> &Sun {
        &self.sun
    }

    pub(crate) fn sun_mut(&mut self) -> &mut Sun {
        &mut self.sun
    }

    pub fn lookup(&self, name: &str) -> Option<&CelestialBody> {
        self.index.get(name).map(|&i| &self.bodies[i])
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut CelestialBody> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.bodies[i]),
            None => None,
        }
    }

    /// Bodies in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CelestialBody> {
        self.bodies.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Sets one body's speed multiplier
    pub fn set_speed(&mut self, name: &str, speed: f64) -> SolarResult<()> {
        self.lookup_mut(name)
            .ok_or_else(|| SolarError::UnknownBody(name.to_string()))?
            .set_speed(speed)
    }

    /// Sets every body's speed multiplier
    pub fn set_all_speeds(&mut self, speed: f64) -> SolarResult<()> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(SolarError::SpeedOutOfRange(speed));
        }
        for body in self.bodies.iter_mut() {
            body.speed = speed;
        }
        Ok(())
    }
}
