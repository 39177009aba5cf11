use crate::body::Registry;
use crate::math::{
    add, multiply_matrices, multiply_matrix_vector, rotation_x, rotation_y, Mat3, PointLight, Vec3,
    IDENTITY,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Body that carries the ring
pub const RINGED_BODY: &str = "Saturn";

/// Index of a node inside its scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Position and Euler rotation relative to the parent node
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation_x: f64,
    pub rotation_y: f64,
}

impl Transform {
    fn at(translation: Vec3) -> Self {
        Transform {
            translation,
            ..Transform::default()
        }
    }

    fn rotation(&self) -> Mat3 {
        multiply_matrices(&rotation_x(self.rotation_x), &rotation_y(self.rotation_y))
    }
}

/// Rotation and translation of a node in world space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform {
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl WorldTransform {
    const IDENTITY: WorldTransform = WorldTransform {
        rotation: IDENTITY,
        translation: [0.0; 3],
    };

    /// Maps a point from the node's local space into world space
    pub fn apply(&self, point: &Vec3) -> Vec3 {
        add(&multiply_matrix_vector(&self.rotation, point), &self.translation)
    }

    fn then(&self, local: &Transform) -> WorldTransform {
        WorldTransform {
            rotation: multiply_matrices(&self.rotation, &local.rotation()),
            translation: self.apply(&local.translation),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Anchor with no geometry of its own
    Empty,
    Sphere { radius: f64 },
    /// Flat annulus in the local XY plane
    Ring { inner: f64, outer: f64, segments: usize },
    Points(Vec<Vec3>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    None,
    /// Unlit, always drawn at full colour
    Basic { color: u32 },
    /// Lit by the scene's point light
    Standard { color: u32 },
    Points { color: u32 },
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub shape: Shape,
    pub material: Material,
    pub local: Transform,
    pub parent: Option<NodeId>,
}

/// Nodes created for one planet
#[derive(Clone, Debug, PartialEq)]
pub struct BodyNodes {
    pub name: String,
    /// Sits at the origin; its Y rotation is the orbit angle
    pub pivot: NodeId,
    /// Child of the pivot at the orbit radius; its Y rotation is the self-rotation
    pub mesh: NodeId,
}

/// Parameters of the random star backdrop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarfieldConfig {
    pub count: usize,
    /// Edge length of the cube the stars are scattered in
    pub spread: f64,
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        StarfieldConfig {
            count: 10_000,
            spread: 2000.0,
            seed: None,
        }
    }
}

/// Scene graph holding every drawable of the solar system
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Node>,
    sun: NodeId,
    bodies: Vec<BodyNodes>,
    ring: Option<NodeId>,
    stars: NodeId,
    pub light: PointLight,
}

impl Scene {
    /// Builds the scene graph for the current registry
    pub fn build(registry: &Registry, starfield: &StarfieldConfig) -> Self {
        let mut scene = Scene {
            nodes: Vec::new(),
            sun: NodeId(0),
            bodies: Vec::with_capacity(registry.len()),
            ring: None,
            stars: NodeId(0),
            light: PointLight {
                position: [0.0, 0.0, 0.0],
                intensity: 2.0,
                range: 300.0,
            },
        };

        let sun = registry.sun();
        scene.sun = scene.add(Node {
            name: "Sun".to_string(),
            shape: Shape::Sphere { radius: sun.radius },
            material: Material::Basic { color: sun.color },
            local: Transform::default(),
            parent: None,
        });

        for body in registry.iter() {
            let pivot = scene.add(Node {
                name: format!("{} pivot", body.name()),
                shape: Shape::Empty,
                material: Material::None,
                local: Transform::default(),
                parent: None,
            });
            let mesh = scene.add(Node {
                name: body.name().to_string(),
                shape: Shape::Sphere {
                    radius: body.radius(),
                },
                material: Material::Standard { color: body.color() },
                local: Transform::at([body.orbit_radius(), 0.0, 0.0]),
                parent: Some(pivot),
            });
            scene.bodies.push(BodyNodes {
                name: body.name().to_string(),
                pivot,
                mesh,
            });
        }

        match scene.body(RINGED_BODY).map(|nodes| nodes.mesh) {
            Some(mesh) => {
                let ring = scene.add(Node {
                    name: format!("{} ring", RINGED_BODY),
                    shape: Shape::Ring {
                        inner: 7.0,
                        outer: 10.0,
                        segments: 32,
                    },
                    material: Material::Basic { color: 0xaaaaaa },
                    local: Transform {
                        rotation_x: -0.5 * PI,
                        ..Transform::default()
                    },
                    parent: Some(mesh),
                });
                scene.ring = Some(ring);
            }
            None => log::warn!("no {} in the registry, skipping its ring", RINGED_BODY),
        }

        scene.stars = scene.add(Node {
            name: "Stars".to_string(),
            shape: Shape::Points(scatter_stars(starfield)),
            material: Material::Points { color: 0xffffff },
            local: Transform::default(),
            parent: None,
        });

        log::debug!(
            "scene built: {} nodes, {} stars",
            scene.nodes.len(),
            starfield.count
        );
        scene
    }

    fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Copies the registry's angles into the node transforms
    pub fn sync(&mut self, registry: &Registry) {
        let sun = self.sun;
        self.nodes[sun.0].local.rotation_y = registry.sun().rotation();

        for nodes in &self.bodies {
            match registry.lookup(&nodes.name) {
                Some(body) => {
                    self.nodes[nodes.pivot.0].local.rotation_y = body.orbit_angle();
                    self.nodes[nodes.mesh.0].local.rotation_y = body.self_rotation();
                }
                None => log::warn!("scene node {} has no body in the registry", nodes.name),
            }
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    pub fn sun(&self) -> NodeId {
        self.sun
    }

    pub fn bodies(&self) -> &[BodyNodes] {
        &self.bodies
    }

    pub fn body(&self, name: &str) -> Option<&BodyNodes> {
        self.bodies.iter().find(|nodes| nodes.name == name)
    }

    pub fn ring(&self) -> Option<NodeId> {
        self.ring
    }

    pub fn stars(&self) -> NodeId {
        self.stars
    }

    /// Composes the transforms from the root down to `id`
    pub fn world_transform(&self, id: NodeId) -> WorldTransform {
        let node = &self.nodes[id.0];
        let parent = match node.parent {
            Some(parent) => self.world_transform(parent),
            None => WorldTransform::IDENTITY,
        };
        parent.then(&node.local)
    }
}

fn scatter_stars(config: &StarfieldConfig) -> Vec<Vec3> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    (0..config.count)
        .map(|_| {
            [
                (rng.gen::<f64>() - 0.5) * config.spread,
                (rng.gen::<f64>() - 0.5) * config.spread,
                (rng.gen::<f64>() - 0.5) * config.spread,
            ]
        })
        .collect()
}
