//! Unit namespace: the code-loading primitive of a scope.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use fastreflect_core::{Invoke, MemberDescriptor, ResolutionCause, ResolutionError};
use fastreflect_host::Lookup;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::{CanonicalName, canonicalize};
use crate::synth::{self, GeneratedUnit, UnitCode};

/// A unit defined in a namespace.
///
/// Initialization runs the resolution step exactly once; its outcome,
/// success or failure, is kept for the unit's lifetime.
pub struct DefinedUnit {
    name: CanonicalName,
    descriptor: Arc<MemberDescriptor>,
    code: UnitCode,
    verify: bool,
    target: OnceLock<Result<Arc<dyn Invoke>, ResolutionError>>,
}

impl DefinedUnit {
    pub fn name(&self) -> &CanonicalName {
        &self.name
    }

    pub fn descriptor(&self) -> &Arc<MemberDescriptor> {
        &self.descriptor
    }

    pub fn code(&self) -> &UnitCode {
        &self.code
    }

    pub fn is_initialized(&self) -> bool {
        self.target.get().is_some()
    }

    /// Run (or replay) the resolution step.
    pub fn initialize(&self, lookup: &Lookup) -> Result<Arc<dyn Invoke>, ResolutionError> {
        self.target
            .get_or_init(|| {
                let outcome = self.resolve(lookup);
                match &outcome {
                    Ok(_) => debug!(unit = %self.name, "resolved unit"),
                    Err(err) => warn!(unit = %self.name, member = %self.descriptor, error = %err, "unit resolution failed"),
                }
                outcome
            })
            .clone()
    }

    fn resolve(&self, lookup: &Lookup) -> Result<Arc<dyn Invoke>, ResolutionError> {
        let rejected = |err: synth::CodeError| {
            ResolutionError::new(self.name.as_str(), ResolutionCause::Verification(err.to_string()))
        };
        let ops = self.code.decode().map_err(rejected)?;
        let strategy = if self.verify {
            synth::verify(&ops, &self.descriptor).map_err(rejected)?.resolve
        } else {
            synth::resolve_strategy(&ops).map_err(rejected)?
        };
        synth::bind_target(lookup, &self.descriptor, strategy)
            .map_err(|err| ResolutionError::new(self.name.as_str(), err))
    }
}

impl fmt::Debug for DefinedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinedUnit")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Canonical-name to unit mapping owned by one scope.
pub struct UnitNamespace {
    units: RwLock<FxHashMap<CanonicalName, Arc<DefinedUnit>>>,
    verify: bool,
    defined: AtomicU64,
}

impl UnitNamespace {
    pub fn new(verify: bool) -> Self {
        Self {
            units: RwLock::new(FxHashMap::default()),
            verify,
            defined: AtomicU64::new(0),
        }
    }

    /// Define a unit. Defining a name that already exists returns the
    /// existing unit and drops the new one.
    ///
    /// A unit whose name is not the canonical name of its descriptor is
    /// rejected and nothing is stored.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn define(&self, unit: GeneratedUnit) -> Result<Arc<DefinedUnit>, ResolutionError> {
        check_label(&unit)?;
        if let Some(existing) = self.get(&unit.name) {
            trace!(unit = %unit.name, "unit already defined");
            return Ok(existing);
        }

        let mut units = self.units.write();
        if let Some(existing) = units.get(&unit.name) {
            return Ok(existing.clone());
        }
        let GeneratedUnit { name, code, descriptor } = unit;
        let defined = Arc::new(DefinedUnit {
            name: name.clone(),
            descriptor,
            code,
            verify: self.verify,
            target: OnceLock::new(),
        });
        units.insert(name, defined.clone());
        self.defined.fetch_add(1, Ordering::Relaxed);
        debug!(unit = %defined.name, "defined unit");
        Ok(defined)
    }

    pub fn get(&self, name: &CanonicalName) -> Option<Arc<DefinedUnit>> {
        self.units.read().get(name).cloned()
    }

    pub fn is_defined(&self, name: &CanonicalName) -> bool {
        self.units.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.read().is_empty()
    }

    /// Number of successful (non-duplicate) definitions.
    pub fn definitions(&self) -> u64 {
        self.defined.load(Ordering::Relaxed)
    }
}

/// Reject a unit labelled with another member's canonical name.
pub(crate) fn check_label(unit: &GeneratedUnit) -> Result<(), ResolutionError> {
    let expected = canonicalize(&unit.descriptor);
    if unit.name == expected {
        return Ok(());
    }
    let err = synth::CodeError::Malformed(format!(
        "unit {} carries {}, whose canonical name is {}",
        unit.name, unit.descriptor, expected
    ));
    warn!(unit = %unit.name, error = %err, "rejected mislabelled unit");
    Err(ResolutionError::new(unit.name.as_str(), ResolutionCause::Verification(err.to_string())))
}
