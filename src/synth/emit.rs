//! Per-kind emitters sharing one emission skeleton.

use fastreflect_core::{MemberDescriptor, MemberKind, ReceiverMode};

use super::code::{CodeError, Op, UnitCode};
use super::strategy::{MemberStrategy, ResolveStrategy, ResultShape};

/// Chooses the strategy record for one member kind.
///
/// Emission itself is shared: every kind produces the same op skeleton,
/// specialised only by its strategy.
pub trait KindEmitter: Send + Sync {
    fn kind(&self) -> MemberKind;

    fn strategy(&self, descriptor: &MemberDescriptor) -> MemberStrategy;

    fn emit(&self, descriptor: &MemberDescriptor) -> UnitCode {
        emit_skeleton(&self.strategy(descriptor))
    }
}

/// Instance or static method: receiver cast unless static, boxed or void result.
pub struct MethodEmitter;

impl KindEmitter for MethodEmitter {
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn strategy(&self, descriptor: &MemberDescriptor) -> MemberStrategy {
        let resolve = if descriptor.is_static() {
            ResolveStrategy::Static
        } else {
            ResolveStrategy::Virtual
        };
        let result = if descriptor.return_type.is_void() {
            ResultShape::Void
        } else {
            ResultShape::Boxed
        };
        MemberStrategy::new(resolve, descriptor.arity(), result, !descriptor.is_static())
    }
}

/// Constructor: no receiver, result is the constructed instance.
pub struct ConstructorEmitter;

impl KindEmitter for ConstructorEmitter {
    fn kind(&self) -> MemberKind {
        MemberKind::Constructor
    }

    fn strategy(&self, descriptor: &MemberDescriptor) -> MemberStrategy {
        MemberStrategy::new(
            ResolveStrategy::Constructor,
            descriptor.arity(),
            ResultShape::Constructed,
            false,
        )
    }
}

/// Field read: a zero-argument method bound to the read accessor.
pub struct FieldGetterEmitter;

impl KindEmitter for FieldGetterEmitter {
    fn kind(&self) -> MemberKind {
        MemberKind::FieldGetter
    }

    fn strategy(&self, descriptor: &MemberDescriptor) -> MemberStrategy {
        MemberStrategy::new(ResolveStrategy::FieldRead, 0, ResultShape::Boxed, !descriptor.is_static())
    }
}

/// Field write: a one-argument void method bound to the write accessor.
pub struct FieldSetterEmitter;

impl KindEmitter for FieldSetterEmitter {
    fn kind(&self) -> MemberKind {
        MemberKind::FieldSetter
    }

    fn strategy(&self, descriptor: &MemberDescriptor) -> MemberStrategy {
        MemberStrategy::new(ResolveStrategy::FieldWrite, 1, ResultShape::Void, !descriptor.is_static())
    }
}

/// The emitter for a member kind.
pub fn emitter_for(kind: MemberKind) -> &'static dyn KindEmitter {
    match kind {
        MemberKind::Method => &MethodEmitter,
        MemberKind::Constructor => &ConstructorEmitter,
        MemberKind::FieldGetter => &FieldGetterEmitter,
        MemberKind::FieldSetter => &FieldSetterEmitter,
    }
}

fn emit_skeleton(strategy: &MemberStrategy) -> UnitCode {
    let arity = u8::try_from(strategy.shape.arity).unwrap_or(u8::MAX);
    let mut ops = Vec::with_capacity(6 + arity as usize);
    ops.push(Op::Resolve(strategy.resolve));
    ops.push(Op::LoadHandle);
    if strategy.receiver_cast {
        ops.push(Op::CastReceiver);
    }
    for index in 0..arity {
        ops.push(Op::UnboxArg(index));
    }
    ops.push(Op::CallExact(arity));
    match strategy.shape.result {
        ResultShape::Boxed | ResultShape::Constructed => ops.push(Op::BoxResult),
        ResultShape::Void => ops.push(Op::PushVoid),
    }
    ops.push(Op::Return);
    UnitCode::assemble(&ops)
}

/// The resolve strategy a unit was generated with.
pub fn resolve_strategy(ops: &[Op]) -> Result<ResolveStrategy, CodeError> {
    match ops.first() {
        Some(Op::Resolve(strategy)) => Ok(*strategy),
        _ => Err(CodeError::Malformed("code does not start with a resolve step".into())),
    }
}

/// Load-time checks: the decoded ops must be exactly what the descriptor's
/// emitter would produce, and agree with the descriptor's specialization.
pub fn verify(ops: &[Op], descriptor: &MemberDescriptor) -> Result<MemberStrategy, CodeError> {
    let expected = emitter_for(descriptor.kind).strategy(descriptor);

    let resolve = resolve_strategy(ops)?;
    if resolve != expected.resolve {
        return Err(CodeError::Malformed(format!(
            "resolve strategy {} does not match a {} ({} expected)",
            resolve, descriptor.kind, expected.resolve
        )));
    }

    if descriptor.kind == MemberKind::Constructor && descriptor.return_type != descriptor.declaring_type {
        return Err(CodeError::Malformed(format!(
            "constructor of {} builds {}",
            descriptor.declaring_type, descriptor.return_type
        )));
    }

    let specialization = descriptor.specialization;
    let needs_receiver = specialization.receiver() != ReceiverMode::None;
    if expected.receiver_cast != needs_receiver {
        return Err(CodeError::Malformed(format!(
            "receiver cast {} but the call target {} a receiver",
            if expected.receiver_cast { "emitted" } else { "omitted" },
            if needs_receiver { "takes" } else { "takes no" }
        )));
    }
    if expected.shape.arity != descriptor.arity() || specialization.arity() != descriptor.arity() {
        return Err(CodeError::Malformed(format!(
            "arity mismatch: unit {}, descriptor {}, call target {}",
            expected.shape.arity,
            descriptor.arity(),
            specialization.arity()
        )));
    }

    let canonical = emit_skeleton(&expected).decode()?;
    if canonical.as_slice() != ops {
        return Err(CodeError::Malformed(format!(
            "op sequence differs from the {} skeleton",
            descriptor.kind
        )));
    }
    Ok(expected)
}
