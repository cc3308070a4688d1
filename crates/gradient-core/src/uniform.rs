//! Typed uniform graph.
//!
//! A [`Uniform`] is either a leaf (scalar, vector, matrix) or a container
//! (struct, array) of further uniforms. The graph generates its own GLSL
//! declarations and, once expanded into leaf bindings, uploads itself one
//! leaf at a time. Declaration text and binding names are derived from the
//! same naming rules (`parent.field`, `parent[i]`), which is what lets
//! location lookups succeed after linking.

use crate::error::UniformError;
use crate::gl::{GlBackend, ShaderStage};
use fnv::FnvHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Index path from a [`UniformSet`] root down to one leaf.
pub type UniformPath = SmallVec<[usize; 4]>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Struct,
    Array,
}

impl UniformKind {
    /// GLSL type keyword for leaf kinds.
    pub fn glsl_type(self) -> Option<&'static str> {
        match self {
            UniformKind::Float => Some("float"),
            UniformKind::Int => Some("int"),
            UniformKind::Vec2 => Some("vec2"),
            UniformKind::Vec3 => Some("vec3"),
            UniformKind::Vec4 => Some("vec4"),
            UniformKind::Mat4 => Some("mat4"),
            UniformKind::Struct | UniformKind::Array => None,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.glsl_type() {
            Some(t) => f.write_str(t),
            None if *self == UniformKind::Struct => f.write_str("struct"),
            None => f.write_str("array"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4 { value: [f32; 16], transpose: bool },
    Struct(UniformSet),
    Array(Vec<Uniform>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4 { .. } => UniformKind::Mat4,
            UniformValue::Struct(_) => UniformKind::Struct,
            UniformValue::Array(_) => UniformKind::Array,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    value: UniformValue,
    exclude_from: Option<ShaderStage>,
}

impl Uniform {
    fn from_value(value: UniformValue) -> Self {
        Self {
            value,
            exclude_from: None,
        }
    }

    pub fn float(value: f32) -> Self {
        Self::from_value(UniformValue::Float(value))
    }

    pub fn int(value: i32) -> Self {
        Self::from_value(UniformValue::Int(value))
    }

    pub fn vec2(value: [f32; 2]) -> Self {
        Self::from_value(UniformValue::Vec2(value))
    }

    pub fn vec3(value: [f32; 3]) -> Self {
        Self::from_value(UniformValue::Vec3(value))
    }

    pub fn vec4(value: [f32; 4]) -> Self {
        Self::from_value(UniformValue::Vec4(value))
    }

    pub fn mat4(value: [f32; 16]) -> Self {
        Self::from_value(UniformValue::Mat4 {
            value,
            transpose: false,
        })
    }

    pub fn structure(fields: UniformSet) -> Self {
        Self::from_value(UniformValue::Struct(fields))
    }

    /// Builds an array uniform. Elements must be non-empty and share one shape
    /// (same kind, and for structs the same field names and kinds).
    pub fn array(name: &str, elements: Vec<Uniform>) -> Result<Self, UniformError> {
        let first = elements.first().ok_or_else(|| UniformError::EmptyArray {
            name: name.to_owned(),
        })?;
        let expected = first.shape();
        if let Some(odd) = elements.iter().map(Uniform::shape).find(|s| *s != expected) {
            return Err(UniformError::MixedArray {
                name: name.to_owned(),
                expected,
                found: odd,
            });
        }
        Ok(Self::from_value(UniformValue::Array(elements)))
    }

    /// Marks a matrix as transposed on upload. No effect on other kinds.
    pub fn transposed(mut self) -> Self {
        if let UniformValue::Mat4 { transpose, .. } = &mut self.value {
            *transpose = true;
        }
        self
    }

    /// Suppresses declaration in `stage`.
    pub fn excluded_from(mut self, stage: ShaderStage) -> Self {
        self.exclude_from = Some(stage);
        self
    }

    pub fn kind(&self) -> UniformKind {
        self.value.kind()
    }

    pub fn value(&self) -> &UniformValue {
        &self.value
    }

    pub fn exclude_from(&self) -> Option<ShaderStage> {
        self.exclude_from
    }

    /// Replaces a leaf value in place. Returns `false` (and leaves the uniform
    /// untouched) when `value` is a container or of a different kind.
    pub fn set(&mut self, value: UniformValue) -> bool {
        let kind = value.kind();
        if kind != self.kind() || matches!(kind, UniformKind::Struct | UniformKind::Array) {
            return false;
        }
        self.value = value;
        true
    }

    pub fn field(&self, name: &str) -> Option<&Uniform> {
        match &self.value {
            UniformValue::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Uniform> {
        match &mut self.value {
            UniformValue::Struct(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    pub fn element(&self, index: usize) -> Option<&Uniform> {
        match &self.value {
            UniformValue::Array(elements) => elements.get(index),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut Uniform> {
        match &mut self.value {
            UniformValue::Array(elements) => elements.get_mut(index),
            _ => None,
        }
    }

    /// GLSL declaration of this uniform under `name` for `stage`, or an empty
    /// string when the uniform is excluded from that stage.
    ///
    /// `length` is set when the uniform is the element type of an array.
    pub fn declaration(&self, name: &str, stage: ShaderStage, length: Option<usize>) -> String {
        if self.exclude_from == Some(stage) {
            return String::new();
        }
        let suffix = match length {
            Some(n) if n > 0 => format!("[{n}]"),
            _ => String::new(),
        };
        match &self.value {
            UniformValue::Array(elements) => {
                let element = elements
                    .first()
                    .map(|first| first.declaration(name, stage, Some(elements.len())))
                    .unwrap_or_default();
                format!("{element}\nconst int {name}_length = {};", elements.len())
            }
            UniformValue::Struct(fields) => {
                let body = fields
                    .iter()
                    .map(|(field_name, field)| {
                        let decl = field.declaration(field_name, stage, None);
                        decl.strip_prefix("uniform").map(str::to_owned).unwrap_or(decl)
                    })
                    .filter(|decl| !decl.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "uniform struct {}\n{{\n{body}\n}} {name}{suffix};",
                    struct_type_name(name)
                )
            }
            leaf => {
                let ty = leaf.kind().glsl_type().unwrap_or("float");
                format!("uniform {ty} {name}{suffix};")
            }
        }
    }

    /// Uploads a leaf value to `location`. Containers have no upload of their
    /// own; their leaves are bound individually.
    pub fn upload<B: GlBackend>(&self, gl: &B, location: &B::UniformLocation) {
        match &self.value {
            UniformValue::Float(v) => gl.uniform1f(location, *v),
            UniformValue::Int(v) => gl.uniform1i(location, *v),
            UniformValue::Vec2(v) => gl.uniform2fv(location, v),
            UniformValue::Vec3(v) => gl.uniform3fv(location, v),
            UniformValue::Vec4(v) => gl.uniform4fv(location, v),
            UniformValue::Mat4 { value, transpose } => {
                gl.uniform_matrix4fv(location, *transpose, value)
            }
            UniformValue::Struct(_) | UniformValue::Array(_) => {}
        }
    }

    fn shape(&self) -> String {
        match &self.value {
            UniformValue::Struct(fields) => {
                let inner = fields
                    .iter()
                    .map(|(n, u)| format!("{n}:{}", u.shape()))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("struct{{{inner}}}")
            }
            UniformValue::Array(elements) => match elements.first() {
                Some(first) => format!("{}[{}]", first.shape(), elements.len()),
                None => "array[0]".to_owned(),
            },
            leaf => leaf.kind().to_string(),
        }
    }

    fn collect_leaves(&self, name: String, path: &mut UniformPath, out: &mut Vec<(String, UniformPath)>) {
        match &self.value {
            UniformValue::Array(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    path.push(i);
                    element.collect_leaves(format!("{name}[{i}]"), path, out);
                    path.pop();
                }
            }
            UniformValue::Struct(fields) => {
                for (i, (field_name, field)) in fields.iter().enumerate() {
                    path.push(i);
                    field.collect_leaves(format!("{name}.{field_name}"), path, out);
                    path.pop();
                }
            }
            _ => out.push((name, path.clone())),
        }
    }

    fn child(&self, index: usize) -> Option<&Uniform> {
        match &self.value {
            UniformValue::Struct(fields) => fields.entries.get(index).map(|(_, u)| u),
            UniformValue::Array(elements) => elements.get(index),
            _ => None,
        }
    }
}

/// `u_vertDeform` -> `VertDeform`.
pub fn struct_type_name(name: &str) -> String {
    let bare = name.strip_prefix("u_").unwrap_or(name);
    let mut chars = bare.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Insertion-ordered mapping from uniform name to [`Uniform`].
///
/// Order matters: it fixes the order of generated declarations and of
/// struct fields.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformSet {
    entries: Vec<(String, Uniform)>,
    index: FnvHashMap<String, usize>,
}

impl UniformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`UniformSet::insert`].
    pub fn with(mut self, name: &str, uniform: Uniform) -> Self {
        self.insert(name, uniform);
        self
    }

    /// Inserts or replaces `name`, keeping the original position on replace.
    pub fn insert(&mut self, name: &str, uniform: Uniform) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = uniform,
            None => {
                self.index.insert(name.to_owned(), self.entries.len());
                self.entries.push((name.to_owned(), uniform));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Uniform> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Uniform> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Uniform)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declarations of every uniform for `stage`, one per line.
    pub fn declarations(&self, stage: ShaderStage) -> String {
        self.entries
            .iter()
            .map(|(name, uniform)| uniform.declaration(name, stage, None))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Expands structs and arrays into `(binding name, path)` pairs, one per
    /// leaf, in declaration order.
    pub fn leaf_bindings(&self) -> Vec<(String, UniformPath)> {
        let mut out = Vec::new();
        let mut path = UniformPath::new();
        for (i, (name, uniform)) in self.entries.iter().enumerate() {
            path.push(i);
            uniform.collect_leaves(name.clone(), &mut path, &mut out);
            path.pop();
        }
        out
    }

    /// Resolves a path produced by [`UniformSet::leaf_bindings`].
    pub fn leaf(&self, path: &[usize]) -> Option<&Uniform> {
        let (&head, rest) = path.split_first()?;
        let mut node = &self.entries.get(head)?.1;
        for &i in rest {
            node = node.child(i)?;
        }
        Some(node)
    }
}
