//! A statically describable tree of "ports" (named handlers), dispatching an
//! incoming message to a handler by walking its address against declared
//! patterns.
//!
//! The ports graph is never mutated at runtime: a [`Port`] table is meant to
//! live in a `static`, and descent into a nested table is a relation (a
//! `recurse` function pointer) rather than ownership.

/// A handler invoked for a matched leaf port: the full message buffer and
/// the caller's (possibly narrowed) context.
pub type Handler<Ctx> = fn(&[u8], &mut Ctx);

/// A subtree's descent function: given the address as seen at this point in
/// the tree, the full message buffer, and the context, it narrows the
/// context and dispatches into a nested table, returning whether a handler
/// there was invoked.
pub type Recurse<Ctx> = fn(&str, &[u8], &mut Ctx) -> bool;

/// What a [`Port`] does when its pattern matches.
pub enum PortValue<Ctx> {
    Leaf(Handler<Ctx>),
    Subtree(Recurse<Ctx>),
}

// Manual impls: both variants hold only `fn` pointers, which are `Copy`
// regardless of `Ctx`, but a derived impl would wrongly require `Ctx: Copy`.
impl<Ctx> Clone for PortValue<Ctx> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Ctx> Copy for PortValue<Ctx> {}

/// A declared endpoint in a ports table.
///
/// `pattern` is `<address-or-pattern>[:<type-constraint>]` for a leaf, or
/// `<address-or-pattern>/` (trailing slash) for a subtree -- the trailing
/// slash is what distinguishes the two, independent of which [`PortValue`]
/// variant is actually stored, though the two should always agree.
///
/// A type constraint matches iff it is a literal prefix of the incoming
/// message's tag string; an empty constraint accepts any types.
pub struct Port<Ctx> {
    pub pattern: &'static str,
    pub metadata: &'static str,
    pub value: PortValue<Ctx>,
}

/// Returns the first path segment of `address` (without leading/trailing
/// slashes), e.g. `"baz"` for `"/baz/e"` or `"a"` for `"/a"`.
fn first_segment(address: &str) -> &str {
    let rest = address.strip_prefix('/').unwrap_or(address);
    match rest.find('/') {
        Some(idx) => &rest[..idx],
        None => rest,
    }
}

/// Returns the address tail to hand to a nested dispatch call after
/// descending into the subtree matching `address`'s first segment: the
/// portion starting at the next `/`, or `""` if this was the last segment.
pub fn next_segment_tail(address: &str) -> &str {
    let rest = address.strip_prefix('/').unwrap_or(address);
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "",
    }
}

/// Reads the address out of `message_buf` and dispatches it against `ports`.
/// Returns `false` without invoking any handler if `message_buf` is not a
/// well-formed message.
pub fn dispatch<Ctx>(ports: &[Port<Ctx>], message_buf: &[u8], ctx: &mut Ctx) -> bool {
    if crate::decoder::message_length(message_buf).is_none() {
        return false;
    }
    match crate::decoder::address(message_buf) {
        Some(address) => dispatch_at(ports, address, message_buf, ctx),
        None => false,
    }
}

/// Dispatches `message_buf` against `ports` at a caller-supplied `address`,
/// distinct from whatever address bytes `message_buf` actually encodes.
/// This is what a subtree's `recurse` function calls after narrowing the
/// context and computing the tail via [`next_segment_tail`]; it is exposed
/// publicly so a hand-written recurse function (not generated by
/// [`crate::osc_subtree`]) can call it directly.
pub fn dispatch_at<Ctx>(
    ports: &[Port<Ctx>],
    address: &str,
    message_buf: &[u8],
    ctx: &mut Ctx,
) -> bool {
    let segment = first_segment(address);
    for port in ports {
        if let Some(prefix) = port.pattern.strip_suffix('/') {
            if next_segment_tail(address).is_empty() {
                continue;
            }
            if !crate::address::pattern_match(prefix, segment) {
                continue;
            }
            if let PortValue::Subtree(recurse) = port.value {
                if recurse(address, message_buf, ctx) {
                    return true;
                }
            }
        } else {
            let (pat, constraint) = match port.pattern.split_once(':') {
                Some((p, c)) => (p, c),
                None => (port.pattern, ""),
            };
            let remaining = address.strip_prefix('/').unwrap_or(address);
            if !crate::address::pattern_match(pat, remaining) {
                continue;
            }
            let tags = crate::decoder::argument_string(message_buf).unwrap_or("");
            if !constraint.is_empty() && !tags.starts_with(constraint) {
                continue;
            }
            if let PortValue::Leaf(handler) = port.value {
                handler(message_buf, ctx);
                return true;
            }
        }
    }
    false
}

/// Dispatches every message contained in a bundle (recursing into nested
/// bundles) against `ports`, returning whether any handler was invoked.
/// `bundle_timetag` is left for the caller to act on; this function invokes
/// handlers immediately, in declaration order within each element, without
/// scheduling.
pub fn dispatch_bundle<Ctx>(ports: &[Port<Ctx>], bundle_buf: &[u8], ctx: &mut Ctx) -> bool {
    if !crate::decoder::bundle_p(bundle_buf) {
        return dispatch(ports, bundle_buf, ctx);
    }
    let mut any = false;
    for element in crate::decoder::bundle_elements(bundle_buf) {
        let handled = if crate::decoder::bundle_p(element) {
            dispatch_bundle(ports, element, ctx)
        } else {
            dispatch(ports, element, ctx)
        };
        any |= handled;
    }
    any
}

/// Generates a zero-capture `recurse` function suitable for
/// [`PortValue::Subtree`]: it computes the tail address, narrows the
/// context via `$project`, and dispatches into `$table`.
///
/// ```ignore
/// osc_subtree!(voice_recurse, Rack => Voice, |r: &mut Rack| &mut r.voices[0], VOICE_PORTS);
/// ```
#[macro_export]
macro_rules! osc_subtree {
    ($name:ident, $ctx:ty => $sub_ctx:ty, $project:expr, $table:expr) => {
        fn $name(address: &str, message_buf: &[u8], ctx: &mut $ctx) -> bool {
            let tail = $crate::dispatch::next_segment_tail(address);
            if tail.is_empty() {
                return false;
            }
            let project: fn(&mut $ctx) -> &mut $sub_ctx = $project;
            let sub_ctx = project(ctx);
            $crate::dispatch::dispatch_at($table, tail, message_buf, sub_ctx)
        }
    };
}

/// Generates a zero-capture leaf handler suitable for [`PortValue::Leaf`]:
/// it decodes argument 0 as the named [`crate::ArgValue`] variant and
/// assigns it to `ctx.$field`. Silently does nothing if argument 0 is
/// missing or of a different type.
///
/// ```ignore
/// osc_set_field!(set_frequency, Voice, Float(f32), frequency);
/// ```
#[macro_export]
macro_rules! osc_set_field {
    ($name:ident, $ctx:ty, $variant:ident($ty:ty), $field:ident) => {
        fn $name(message_buf: &[u8], ctx: &mut $ctx) {
            if let Some($crate::ArgValue::$variant(v)) = $crate::decoder::argument(message_buf, 0)
            {
                let _: $ty = v;
                ctx.$field = v;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder;

    #[derive(Default)]
    struct Ctx {
        a_hits: u32,
        b_hits: u32,
        e_value: f32,
    }

    fn h_a(_buf: &[u8], ctx: &mut Ctx) {
        ctx.a_hits += 1;
    }
    fn h_b(_buf: &[u8], ctx: &mut Ctx) {
        ctx.b_hits += 1;
    }

    osc_set_field!(h_e, Ctx, Float(f32), e_value);

    const LEAF_PORTS: &[Port<Ctx>] = &[
        Port {
            pattern: "a:f",
            metadata: "",
            value: PortValue::Leaf(h_a),
        },
        Port {
            pattern: "b:f",
            metadata: "",
            value: PortValue::Leaf(h_b),
        },
    ];

    const INNER_PORTS: &[Port<Ctx>] = &[Port {
        pattern: "e:f",
        metadata: "",
        value: PortValue::Leaf(h_e),
    }];

    osc_subtree!(baz_recurse, Ctx => Ctx, |c: &mut Ctx| c, INNER_PORTS);

    const TREE_PORTS: &[Port<Ctx>] = &[Port {
        pattern: "baz/",
        metadata: "",
        value: PortValue::Subtree(baz_recurse),
    }];

    fn encode(address: &str, tags: &str, args: &[crate::ArgValue]) -> ([u8; 64], usize) {
        let mut buf = [0u8; 64];
        let len = encoder::message(&mut buf, address, tags, args);
        (buf, len)
    }

    #[test]
    fn leaf_first_match_wins() {
        let (buf, len) = encode("/a", "f", &[crate::ArgValue::Float(1.0)]);
        let mut ctx = Ctx::default();
        assert!(dispatch(LEAF_PORTS, &buf[..len], &mut ctx));
        assert_eq!(ctx.a_hits, 1);
        assert_eq!(ctx.b_hits, 0);
    }

    #[test]
    fn subtree_descent() {
        let (buf, len) = encode("/baz/e", "f", &[crate::ArgValue::Float(2.5)]);
        let mut ctx = Ctx::default();
        assert!(dispatch(TREE_PORTS, &buf[..len], &mut ctx));
        assert_eq!(ctx.e_value, 2.5);
    }

    #[test]
    fn unmatched_address_returns_false() {
        let (buf, len) = encode("/nope", "f", &[crate::ArgValue::Float(1.0)]);
        let mut ctx = Ctx::default();
        assert!(!dispatch(LEAF_PORTS, &buf[..len], &mut ctx));
    }

    #[test]
    fn type_constraint_is_a_prefix_match() {
        let (buf, len) = encode("/a", "fi", &[crate::ArgValue::Float(1.0), crate::ArgValue::Int(2)]);
        let mut ctx = Ctx::default();
        assert!(dispatch(LEAF_PORTS, &buf[..len], &mut ctx));
        assert_eq!(ctx.a_hits, 1);
    }

    #[test]
    fn subtree_without_further_path_does_not_descend() {
        let (buf, len) = encode("/baz", "", &[]);
        let mut ctx = Ctx::default();
        assert!(!dispatch(TREE_PORTS, &buf[..len], &mut ctx));
    }

    #[test]
    fn malformed_buffer_fails_closed() {
        let buf = [0xFFu8; 4];
        let mut ctx = Ctx::default();
        assert!(!dispatch(LEAF_PORTS, &buf, &mut ctx));
    }
}
