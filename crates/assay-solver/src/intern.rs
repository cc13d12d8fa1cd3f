//! Hash-consing of type structures.
//!
//! Every distinct `TypeData` is stored once and named by a `TypeId`, so two
//! structurally equal types always carry the same id. All methods take `&self`;
//! storage sits behind `RwLock`s and the interner is shared across threads.
//!
//! A union is keyed by its sorted member list, making `A | B` and `B | A` one
//! type. The order members were first written in is recorded separately and
//! used only for display.

use crate::types::*;
use assay_common::{Atom, ShardedInterner};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Low bits of a user `TypeId` pick the bucket; the rest is the slot in it.
const BUCKET_BITS: u32 = 4;
const BUCKETS: usize = 1 << BUCKET_BITS;

type MemberBuffer = SmallVec<[TypeId; 8]>;

#[derive(Default)]
struct TypeBucket {
    slots: FxHashMap<TypeData, u32>,
    data: Vec<TypeData>,
}

/// Append-only table giving each distinct value a dense slot number.
struct Pool<T: ?Sized> {
    entries: Vec<Arc<T>>,
    index: FxHashMap<Arc<T>, u32>,
}

impl<T: ?Sized + Eq + Hash> Pool<T> {
    fn new() -> Self {
        Pool {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn insert<Q>(&mut self, value: Q) -> u32
    where
        Q: Borrow<T> + Into<Arc<T>>,
    {
        if let Some(&slot) = self.index.get(value.borrow()) {
            return slot;
        }
        let shared: Arc<T> = value.into();
        let slot = self.entries.len() as u32;
        self.index.insert(Arc::clone(&shared), slot);
        self.entries.push(shared);
        slot
    }

    fn get(&self, slot: u32) -> Option<Arc<T>> {
        self.entries.get(slot as usize).map(Arc::clone)
    }
}

/// Member lists. Slot 0 is always the empty list.
fn list_pool() -> Pool<[TypeId]> {
    let mut pool = Pool::new();
    pool.insert(Vec::<TypeId>::new());
    pool
}

fn bucket_of(data: &TypeData) -> usize {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish() as usize & (BUCKETS - 1)
}

/// Builtins have fixed ids and are never stored in a bucket.
fn builtin_id(data: &TypeData) -> Option<TypeId> {
    match data {
        TypeData::Intrinsic(kind) => Some(kind.to_type_id()),
        TypeData::Literal(LiteralValue::Boolean(true)) => Some(TypeId::BOOLEAN_TRUE),
        TypeData::Literal(LiteralValue::Boolean(false)) => Some(TypeId::BOOLEAN_FALSE),
        _ => None,
    }
}

fn builtin_data(id: TypeId) -> Option<TypeData> {
    let kind = match id {
        TypeId::BOOLEAN_TRUE => return Some(TypeData::Literal(LiteralValue::Boolean(true))),
        TypeId::BOOLEAN_FALSE => return Some(TypeData::Literal(LiteralValue::Boolean(false))),
        TypeId::ANY => IntrinsicKind::Any,
        TypeId::UNKNOWN => IntrinsicKind::Unknown,
        TypeId::NEVER => IntrinsicKind::Never,
        TypeId::VOID => IntrinsicKind::Void,
        TypeId::UNDEFINED => IntrinsicKind::Undefined,
        TypeId::NULL => IntrinsicKind::Null,
        TypeId::BOOLEAN => IntrinsicKind::Boolean,
        TypeId::NUMBER => IntrinsicKind::Number,
        TypeId::STRING => IntrinsicKind::String,
        _ => return None,
    };
    Some(TypeData::Intrinsic(kind))
}

/// The store of every type built during a run.
pub struct TypeInterner {
    buckets: [RwLock<TypeBucket>; BUCKETS],
    /// Member, parameter and interface names plus string literal values.
    names: ShardedInterner,
    lists: RwLock<Pool<[TypeId]>>,
    objects: RwLock<Pool<ObjectShape>>,
    functions: RwLock<Pool<FunctionShape>>,
    /// Union members in first-written order, keyed by the union's id.
    union_display: RwLock<FxHashMap<TypeId, Arc<[TypeId]>>>,
    /// Object member names in first-written order, keyed by the object's id.
    object_display: RwLock<FxHashMap<TypeId, Arc<[Atom]>>>,
}

impl TypeInterner {
    pub fn new() -> Self {
        TypeInterner {
            buckets: std::array::from_fn(|_| RwLock::default()),
            names: ShardedInterner::new(),
            lists: RwLock::new(list_pool()),
            objects: RwLock::new(Pool::new()),
            functions: RwLock::new(Pool::new()),
            union_display: RwLock::default(),
            object_display: RwLock::default(),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.names.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.names.resolve(atom).to_string()
    }

    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.names.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let pool = self.lists.read().expect("list pool lock poisoned");
        pool.get(id.0).unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Arc<ObjectShape> {
        let pool = self.objects.read().expect("object pool lock poisoned");
        pool.get(id.0).unwrap_or_default()
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        let pool = self.functions.read().expect("function pool lock poisoned");
        pool.get(id.0)
            .unwrap_or_else(|| Arc::new(FunctionShape::new(Vec::new(), TypeId::UNKNOWN)))
    }

    /// The id of `data`, storing it first if it is new.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = builtin_id(&data) {
            return id;
        }
        let bucket = bucket_of(&data);
        if let Some(&slot) = self.buckets[bucket]
            .read()
            .expect("type bucket lock poisoned")
            .slots
            .get(&data)
        {
            return Self::encode(bucket, slot);
        }

        let mut table = self.buckets[bucket].write().expect("type bucket lock poisoned");
        let slot = match table.slots.get(&data).copied() {
            Some(slot) => slot,
            None => {
                let slot = table.data.len() as u32;
                assert!(
                    slot <= (u32::MAX - TypeId::FIRST_USER) >> BUCKET_BITS,
                    "type interner exhausted"
                );
                table.data.push(data.clone());
                table.slots.insert(data, slot);
                slot
            }
        };
        Self::encode(bucket, slot)
    }

    /// The structure behind `id`, or `None` for an id this interner never issued.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return builtin_data(id);
        }
        let offset = id.0.checked_sub(TypeId::FIRST_USER)?;
        let bucket = (offset as usize) & (BUCKETS - 1);
        let slot = (offset >> BUCKET_BITS) as usize;
        let table = self.buckets[bucket].read().expect("type bucket lock poisoned");
        table.data.get(slot).cloned()
    }

    /// Number of interned types, builtins included.
    pub fn len(&self) -> usize {
        let stored: usize = self
            .buckets
            .iter()
            .map(|bucket| bucket.read().expect("type bucket lock poisoned").data.len())
            .sum();
        TypeId::FIRST_USER as usize + stored
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    #[inline]
    fn encode(bucket: usize, slot: u32) -> TypeId {
        TypeId(TypeId::FIRST_USER + ((slot << BUCKET_BITS) | bucket as u32))
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        kind.to_type_id()
    }

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    pub fn literal(&self, value: LiteralValue) -> TypeId {
        self.intern(TypeData::Literal(value))
    }

    /// Build a normalized union. An empty member list yields `never`.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    /// Build a normalized union, rejecting an empty member list.
    ///
    /// Nested unions are flattened and duplicates and `never` are dropped.
    /// `unknown` absorbs the union; `any` stays an ordinary member. Literals
    /// are absorbed by their base primitive, `true | false` becomes `boolean`,
    /// and a single remaining member is returned as itself.
    pub fn try_union(&self, members: Vec<TypeId>) -> Result<TypeId, InvalidType> {
        if members.is_empty() {
            return Err(InvalidType::EmptyUnion);
        }
        Ok(self.union_from_iter(members))
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: MemberBuffer = SmallVec::new();
        for member in members {
            self.push_union_member(&mut flat, member);
        }
        self.normalize_union(flat)
    }

    fn push_union_member(&self, flat: &mut MemberBuffer, member: TypeId) {
        if let Some(members) = self.union_members(member) {
            flat.extend(members.iter().copied());
        } else {
            flat.push(member);
        }
    }

    fn normalize_union(&self, flat: MemberBuffer) -> TypeId {
        let mut seen = FxHashSet::default();
        let mut ordered: MemberBuffer = flat
            .into_iter()
            .filter(|&id| id != TypeId::NEVER && seen.insert(id))
            .collect();

        if seen.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }

        if seen.contains(&TypeId::BOOLEAN_TRUE) && seen.contains(&TypeId::BOOLEAN_FALSE) {
            if let Some(first) = ordered
                .iter_mut()
                .find(|id| **id == TypeId::BOOLEAN_TRUE || **id == TypeId::BOOLEAN_FALSE)
            {
                *first = TypeId::BOOLEAN;
            }
            let mut kept = FxHashSet::default();
            ordered.retain(|id| {
                *id != TypeId::BOOLEAN_TRUE && *id != TypeId::BOOLEAN_FALSE && kept.insert(*id)
            });
        }

        // "a" | string => string, 1 | number => number, true | boolean => boolean
        let primitives: FxHashSet<TypeId> = ordered
            .iter()
            .copied()
            .filter(|id| matches!(*id, TypeId::STRING | TypeId::NUMBER | TypeId::BOOLEAN))
            .collect();
        if !primitives.is_empty() {
            ordered.retain(|id| match self.literal_value(*id) {
                Some(literal) => !primitives.contains(&literal.base_type()),
                None => true,
            });
        }

        match ordered.len() {
            0 => return TypeId::NEVER,
            1 => return ordered[0],
            _ => {}
        }

        let display: Arc<[TypeId]> = Arc::from(ordered.as_slice());
        let mut key = ordered.into_vec();
        key.sort_unstable();
        let list_id = self.intern_type_list(key);
        let union_id = self.intern(TypeData::Union(list_id));
        self.union_display
            .write()
            .expect("union_display lock poisoned")
            .entry(union_id)
            .or_insert(display);
        trace!(union = union_id.0, "interned union");
        union_id
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        self.tuple_with(elements, false)
    }

    pub fn readonly_tuple(&self, elements: Vec<TypeId>) -> TypeId {
        self.tuple_with(elements, true)
    }

    pub fn tuple_with(&self, elements: Vec<TypeId>, readonly: bool) -> TypeId {
        let elements = self.intern_type_list(elements);
        self.intern(TypeData::Tuple { elements, readonly })
    }

    /// A regular (non-fresh) object type.
    pub fn object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_flags(properties, ObjectFlags::empty())
    }

    /// The type of an object literal expression, subject to excess-property checks.
    pub fn fresh_object(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object_with_flags(properties, ObjectFlags::FRESH_LITERAL)
    }

    pub fn object_with_flags(&self, mut properties: Vec<PropertyInfo>, flags: ObjectFlags) -> TypeId {
        let mut seen = FxHashSet::default();
        let written: Arc<[Atom]> = properties
            .iter()
            .map(|prop| prop.name)
            .filter(|name| seen.insert(*name))
            .collect();
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        properties.dedup_by(|later, earlier| later.name == earlier.name);
        let shape_id = self.intern_object_shape(ObjectShape { flags, properties });
        let object_id = self.intern(TypeData::Object(shape_id));
        self.object_display
            .write()
            .expect("object_display lock poisoned")
            .entry(object_id)
            .or_insert(written);
        object_id
    }

    /// Intern a function type without validating its parameter list.
    pub fn function(&self, shape: FunctionShape) -> TypeId {
        let shape_id = self.intern_function_shape(shape);
        self.intern(TypeData::Function(shape_id))
    }

    /// Intern a function type after checking the parameter-list invariants:
    /// a rest parameter is last and array-typed, and no required parameter
    /// follows an optional one.
    pub fn try_function(
        &self,
        params: Vec<ParamInfo>,
        return_type: TypeId,
    ) -> Result<TypeId, InvalidType> {
        let mut seen_optional = false;
        let last = params.len().saturating_sub(1);
        for (idx, param) in params.iter().enumerate() {
            let name = || self.param_name(param, idx);
            if param.rest {
                if idx != last {
                    return Err(InvalidType::RestParameterNotLast { name: name() });
                }
                let is_array_like = param.type_id == TypeId::ANY
                    || matches!(
                        self.lookup(param.type_id),
                        Some(TypeData::Array(_) | TypeData::Tuple { .. })
                    );
                if !is_array_like {
                    return Err(InvalidType::RestParameterNotArray { name: name() });
                }
            } else if param.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(InvalidType::RequiredAfterOptional { name: name() });
            }
        }
        Ok(self.function(FunctionShape::new(params, return_type)))
    }

    /// A reference to a named interface.
    pub fn reference(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.intern(TypeData::Ref(atom))
    }

    fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        TypeListId(self.lists.write().expect("list pool lock poisoned").insert(members))
    }

    fn intern_object_shape(&self, shape: ObjectShape) -> ObjectShapeId {
        ObjectShapeId(self.objects.write().expect("object pool lock poisoned").insert(shape))
    }

    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionShapeId {
        FunctionShapeId(self.functions.write().expect("function pool lock poisoned").insert(shape))
    }

    pub(crate) fn param_name(&self, param: &ParamInfo, idx: usize) -> String {
        match param.name {
            Some(atom) => self.resolve_atom(atom),
            None => format!("arg{idx}"),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Structural equality. Interning makes this an id comparison.
    #[inline]
    pub fn structurally_equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Union members in the order they were first written.
    pub fn union_members(&self, id: TypeId) -> Option<Arc<[TypeId]>> {
        if id.is_intrinsic() {
            return None;
        }
        let TypeData::Union(list_id) = self.lookup(id)? else {
            return None;
        };
        let display = self
            .union_display
            .read()
            .expect("union_display lock poisoned")
            .get(&id)
            .cloned();
        Some(display.unwrap_or_else(|| self.type_list(list_id)))
    }

    /// The members of `id` viewed as a union: the union's members, or `[id]`.
    pub fn union_or_single(&self, id: TypeId) -> Vec<TypeId> {
        match self.union_members(id) {
            Some(members) => members.to_vec(),
            None => vec![id],
        }
    }

    /// Object members in the order they were first written.
    pub fn object_members_in_order(&self, id: TypeId) -> Option<Vec<PropertyInfo>> {
        let shape = self.object_shape_of(id)?;
        let order = self
            .object_display
            .read()
            .expect("object_display lock poisoned")
            .get(&id)
            .cloned();
        let Some(order) = order else {
            return Some(shape.properties.clone());
        };
        Some(order.iter().filter_map(|name| shape.find(*name).cloned()).collect())
    }

    pub fn literal_value(&self, id: TypeId) -> Option<LiteralValue> {
        match self.lookup(id)? {
            TypeData::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn array_element(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(id)? {
            TypeData::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Tuple elements and the readonly flag.
    pub fn tuple_elements(&self, id: TypeId) -> Option<(Arc<[TypeId]>, bool)> {
        match self.lookup(id)? {
            TypeData::Tuple { elements, readonly } => Some((self.type_list(elements), readonly)),
            _ => None,
        }
    }

    pub fn object_shape_of(&self, id: TypeId) -> Option<Arc<ObjectShape>> {
        match self.lookup(id)? {
            TypeData::Object(shape_id) => Some(self.object_shape(shape_id)),
            _ => None,
        }
    }

    pub fn function_shape_of(&self, id: TypeId) -> Option<Arc<FunctionShape>> {
        match self.lookup(id)? {
            TypeData::Function(shape_id) => Some(self.function_shape(shape_id)),
            _ => None,
        }
    }

    pub fn ref_name(&self, id: TypeId) -> Option<Atom> {
        match self.lookup(id)? {
            TypeData::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// The effective type of an optional slot: `T | undefined`.
    pub fn with_undefined(&self, id: TypeId) -> TypeId {
        self.union2(id, TypeId::UNDEFINED)
    }

    /// Replace literal types by their base primitive, through unions.
    ///
    /// `"x"` becomes `string`, `1 | "a"` becomes `number | string`.
    pub fn widen_literal(&self, id: TypeId) -> TypeId {
        if let Some(literal) = self.literal_value(id) {
            return literal.base_type();
        }
        if let Some(members) = self.union_members(id) {
            return self.union(members.iter().map(|m| self.widen_literal(*m)).collect());
        }
        id
    }

    /// Drop the fresh-literal flag from an object type and its nested object
    /// members. Used when an object literal is bound to an inferred variable.
    pub fn widen_freshness(&self, id: TypeId) -> TypeId {
        match self.lookup(id) {
            Some(TypeData::Object(shape_id)) => {
                let shape = self.object_shape(shape_id);
                if !shape.is_fresh() {
                    return id;
                }
                let properties = self
                    .object_members_in_order(id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|prop| PropertyInfo {
                        type_id: self.widen_freshness(prop.type_id),
                        ..prop
                    })
                    .collect();
                self.object(properties)
            }
            Some(TypeData::Union(_)) => {
                let members = self.union_or_single(id);
                self.union(members.into_iter().map(|m| self.widen_freshness(m)).collect())
            }
            Some(TypeData::Array(element)) => self.array(self.widen_freshness(element)),
            Some(TypeData::Tuple { elements, readonly }) => {
                let elements = self.type_list(elements);
                self.tuple_with(
                    elements.iter().map(|e| self.widen_freshness(*e)).collect(),
                    readonly,
                )
            }
            _ => id,
        }
    }

    pub fn is_fresh_object(&self, id: TypeId) -> bool {
        self.object_shape_of(id).is_some_and(|shape| shape.is_fresh())
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
