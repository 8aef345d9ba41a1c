//! Bone hierarchy ordering
//!
//! Skeletons arrive in whatever order the source file stored them, and parent
//! references may point forward. [`SkeletonIndex`] places every parent before
//! its children with a depth-first walk from each root, so later stages can
//! process bones front to back.

use std::fmt;

use hashbrown::HashMap;

use crate::error::RetargetError;
use crate::track::AnimationSample;

/// Reference from a bone to its parent
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// Position of the parent in the skeleton's input order
    Index(usize),
    /// Name of the parent bone
    Name(String),
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Name(name) => write!(f, "'{}'", name),
        }
    }
}

/// A named skeletal joint as loaded from the source skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<ParentRef>,
    /// Bind pose, carried for writers; retargeting never reads it
    pub rest: Option<AnimationSample>,
}

impl Bone {
    /// Bone without a parent
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            rest: None,
        }
    }

    /// Bone parented by name
    pub fn child_of(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(ParentRef::Name(parent.into())),
            rest: None,
        }
    }

    /// Bone parented by input index
    pub fn child_of_index(name: impl Into<String>, parent: usize) -> Self {
        Self {
            name: name.into(),
            parent: Some(ParentRef::Index(parent)),
            rest: None,
        }
    }

    pub fn with_rest(mut self, rest: AnimationSample) -> Self {
        self.rest = Some(rest);
        self
    }
}

/// Bones in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

impl FromIterator<Bone> for Skeleton {
    fn from_iter<I: IntoIterator<Item = Bone>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Which coordinate remap policy a bone gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoneRole {
    /// No parent; samples already carry the target convention
    Root,
    /// Has a parent; samples need the axis remap
    Child,
}

/// A bone placed in hierarchy order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBone {
    pub name: String,
    /// Position in the skeleton's input order
    pub source_index: usize,
    /// Position of the parent in hierarchy order
    pub parent: Option<usize>,
    pub role: BoneRole,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Placed,
}

/// Topologically ordered view of a [`Skeleton`]
///
/// Built once per run and shared read-only by every bone pipeline.
#[derive(Debug, Clone)]
pub struct SkeletonIndex {
    bones: Vec<IndexedBone>,
    positions: HashMap<String, usize>,
}

impl SkeletonIndex {
    /// Order the skeleton so parents precede children
    ///
    /// Roots are visited in input order, and the children of each bone in
    /// their input order, so identical input always yields the same order.
    pub fn build(skeleton: &Skeleton) -> Result<Self, RetargetError> {
        let bones = skeleton.bones();
        let count = bones.len();

        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(count);
        for (i, bone) in bones.iter().enumerate() {
            if by_name.insert(bone.name.as_str(), i).is_some() {
                return Err(RetargetError::DuplicateBoneName(bone.name.clone()));
            }
        }

        // Resolve parents to input indices
        let mut parents: Vec<Option<usize>> = Vec::with_capacity(count);
        for bone in bones {
            let parent = match &bone.parent {
                None => None,
                Some(ParentRef::Index(index)) if *index < count => Some(*index),
                Some(ParentRef::Name(name)) if by_name.contains_key(name.as_str()) => {
                    Some(by_name[name.as_str()])
                }
                Some(other) => {
                    return Err(RetargetError::InvalidHierarchyReference {
                        bone: bone.name.clone(),
                        parent: other.clone(),
                    })
                }
            };
            parents.push(parent);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = *parent {
                children[p].push(i);
            }
        }

        let mut marks = vec![Mark::Unvisited; count];
        let mut order: Vec<usize> = Vec::with_capacity(count);
        let mut stack: Vec<usize> = Vec::new();

        for root in (0..count).filter(|&i| parents[i].is_none()) {
            stack.push(root);
            while let Some(bone) = stack.pop() {
                marks[bone] = Mark::Placed;
                order.push(bone);
                stack.extend(children[bone].iter().rev().copied());
            }
        }

        // Anything not reached from a root hangs off a cycle
        if order.len() < count {
            let start = marks
                .iter()
                .position(|m| *m == Mark::Unvisited)
                .unwrap_or_default();
            let bone = find_cycle_member(start, &parents, &mut marks);
            return Err(RetargetError::CyclicHierarchy {
                bone: bones[bone].name.clone(),
            });
        }

        let mut position_of_source = vec![0usize; count];
        for (position, &source) in order.iter().enumerate() {
            position_of_source[source] = position;
        }

        let indexed: Vec<IndexedBone> = order
            .iter()
            .map(|&source| IndexedBone {
                name: bones[source].name.clone(),
                source_index: source,
                parent: parents[source].map(|p| position_of_source[p]),
                role: if parents[source].is_some() {
                    BoneRole::Child
                } else {
                    BoneRole::Root
                },
            })
            .collect();

        let positions = indexed
            .iter()
            .enumerate()
            .map(|(position, bone)| (bone.name.clone(), position))
            .collect();

        let index = Self {
            bones: indexed,
            positions,
        };

        tracing::debug!(
            "Indexed skeleton: {} bones, {} roots",
            index.len(),
            index.roots().count()
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in hierarchy order
    pub fn iter(&self) -> std::slice::Iter<'_, IndexedBone> {
        self.bones.iter()
    }

    pub fn get(&self, position: usize) -> Option<&IndexedBone> {
        self.bones.get(position)
    }

    /// Hierarchy position of a bone, by exact name
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn role_of(&self, position: usize) -> Option<BoneRole> {
        self.bones.get(position).map(|b| b.role)
    }

    pub fn parent_position(&self, position: usize) -> Option<usize> {
        self.bones.get(position).and_then(|b| b.parent)
    }

    /// Bone names in hierarchy order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    pub fn roots(&self) -> impl Iterator<Item = &IndexedBone> {
        self.bones.iter().filter(|b| b.role == BoneRole::Root)
    }
}

impl<'a> IntoIterator for &'a SkeletonIndex {
    type Item = &'a IndexedBone;
    type IntoIter = std::slice::Iter<'a, IndexedBone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Walk parent links from `start` until a bone repeats; that bone is on the cycle.
///
/// Every bone on the walk is unreachable from a root, so its parent chain can
/// only end in a cycle.
fn find_cycle_member(start: usize, parents: &[Option<usize>], marks: &mut [Mark]) -> usize {
    let mut bone = start;
    while marks[bone] != Mark::InProgress {
        marks[bone] = Mark::InProgress;
        match parents[bone] {
            Some(parent) => bone = parent,
            None => break,
        }
    }
    bone
}
