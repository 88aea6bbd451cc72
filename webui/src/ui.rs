//! The parameter registry and command dispatcher.
//!
//! [`WebUi`] owns the name→parameter bindings, wires the echo
//! suppression protocol, and routes inbound commands. All dispatch
//! happens on the caller's thread during [`WebUi::update`]; per-entry
//! failures are reported to the diagnostic sink and skipped, never
//! aborting the batch or the connection.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::diag::{DiagnosticSink, TracingSink};
use crate::error::UiError;
use crate::event::{self, Event};
use crate::param::{Origin, Param, SlotId};
use crate::transport::{Transport, TransportEvent};
use crate::value::{Color, ParamData, ParamKind, Vec2, Vec3};
use crate::{Builder, Result};

/// One bound parameter behind a uniform handle: the closed dispatch
/// enum over every supported kind.
///
/// Every operation that branches on the held kind is an exhaustive
/// match below; a new kind fails to compile until each site handles
/// it.
pub enum ParamSlot {
    Bool(Param<bool>),
    Int(Param<i32>),
    Float(Param<f32>),
    Double(Param<f64>),
    Str(Param<String>),
    Vec2(Param<Vec2>),
    Vec3(Param<Vec3>),
    Color(Param<Color>),
    List(Param<Vec<String>>),
    Map(Param<HashMap<String, String>>),
}

macro_rules! impl_slot_from {
    ($ty:ty, $variant:ident) => {
        impl From<Param<$ty>> for ParamSlot {
            fn from(param: Param<$ty>) -> Self {
                Self::$variant(param)
            }
        }
    };
}

impl_slot_from!(bool, Bool);
impl_slot_from!(i32, Int);
impl_slot_from!(f32, Float);
impl_slot_from!(f64, Double);
impl_slot_from!(String, Str);
impl_slot_from!(Vec2, Vec2);
impl_slot_from!(Vec3, Vec3);
impl_slot_from!(Color, Color);
impl_slot_from!(Vec<String>, List);
impl_slot_from!(HashMap<String, String>, Map);

impl ParamSlot {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::Int(_) => ParamKind::Int,
            Self::Float(_) => ParamKind::Float,
            Self::Double(_) => ParamKind::Double,
            Self::Str(_) => ParamKind::String,
            Self::Vec2(_) => ParamKind::Vec2,
            Self::Vec3(_) => ParamKind::Vec3,
            Self::Color(_) => ParamKind::Color,
            Self::List(_) => ParamKind::List,
            Self::Map(_) => ParamKind::Map,
        }
    }

    /// Serializes the current value into its wire shape.
    fn to_wire(&self) -> Value {
        match self {
            Self::Bool(param) => param.get().to_wire(),
            Self::Int(param) => param.get().to_wire(),
            Self::Float(param) => param.get().to_wire(),
            Self::Double(param) => param.get().to_wire(),
            Self::Str(param) => param.get().to_wire(),
            Self::Vec2(param) => param.get().to_wire(),
            Self::Vec3(param) => param.get().to_wire(),
            Self::Color(param) => param.get().to_wire(),
            Self::List(param) => param.get().to_wire(),
            Self::Map(param) => param.get().to_wire(),
        }
    }

    /// Human-readable current value, for diagnostics.
    fn stringify(&self) -> String {
        match self {
            Self::Bool(param) => format!("{:?}", param.get()),
            Self::Int(param) => format!("{:?}", param.get()),
            Self::Float(param) => format!("{:?}", param.get()),
            Self::Double(param) => format!("{:?}", param.get()),
            Self::Str(param) => format!("{:?}", param.get()),
            Self::Vec2(param) => format!("{:?}", param.get()),
            Self::Vec3(param) => format!("{:?}", param.get()),
            Self::Color(param) => format!("{:?}", param.get()),
            Self::List(param) => format!("{:?}", param.get()),
            Self::Map(param) => format!("{:?}", param.get()),
        }
    }

    /// Decodes `wire` and stores it with the given origin.
    ///
    /// Decode failure leaves the stored value untouched. A wire `set`
    /// replaces the value for every kind except `map`, which upserts
    /// its entries into the existing map.
    fn apply_set(&self, wire: &Value, origin: Origin) -> Result<()> {
        match self {
            Self::Bool(param) => {
                param.set_from(origin, bool::from_wire(wire)?);
            }
            Self::Int(param) => {
                param.set_from(origin, i32::from_wire(wire)?);
            }
            Self::Float(param) => {
                param.set_from(origin, f32::from_wire(wire)?);
            }
            Self::Double(param) => {
                param.set_from(origin, f64::from_wire(wire)?);
            }
            Self::Str(param) => {
                param.set_from(origin, String::from_wire(wire)?);
            }
            Self::Vec2(param) => {
                param.set_from(origin, Vec2::from_wire(wire)?);
            }
            Self::Vec3(param) => {
                param.set_from(origin, Vec3::from_wire(wire)?);
            }
            Self::Color(param) => {
                param.set_from(origin, Color::from_wire(wire)?);
            }
            Self::List(param) => {
                param.set_from(origin, Vec::<String>::from_wire(wire)?);
            }
            Self::Map(param) => {
                param.merge_from(origin, HashMap::<String, String>::from_wire(wire)?);
            }
        }
        Ok(())
    }

    /// Decodes `wire` as a selection and stores it with the given
    /// origin. The value itself is untouched.
    fn apply_select(&self, wire: &Value, origin: Origin) -> Result<()> {
        match self {
            Self::Bool(param) => {
                param.select_from(origin, bool::selected_from_wire(wire)?);
            }
            Self::Int(param) => {
                param.select_from(origin, i32::selected_from_wire(wire)?);
            }
            Self::Float(param) => {
                param.select_from(origin, f32::selected_from_wire(wire)?);
            }
            Self::Double(param) => {
                param.select_from(origin, f64::selected_from_wire(wire)?);
            }
            Self::Str(param) => {
                param.select_from(origin, String::selected_from_wire(wire)?);
            }
            Self::Vec2(param) => {
                param.select_from(origin, Vec2::selected_from_wire(wire)?);
            }
            Self::Vec3(param) => {
                param.select_from(origin, Vec3::selected_from_wire(wire)?);
            }
            Self::Color(param) => {
                param.select_from(origin, Color::selected_from_wire(wire)?);
            }
            Self::List(param) => {
                param.select_from(origin, Vec::<String>::selected_from_wire(wire)?);
            }
            Self::Map(param) => {
                param.select_from(origin, HashMap::<String, String>::selected_from_wire(wire)?);
            }
        }
        Ok(())
    }

    fn disconnect(&self, subscription: SlotId) {
        match self {
            Self::Bool(param) => param.disconnect_set(subscription),
            Self::Int(param) => param.disconnect_set(subscription),
            Self::Float(param) => param.disconnect_set(subscription),
            Self::Double(param) => param.disconnect_set(subscription),
            Self::Str(param) => param.disconnect_set(subscription),
            Self::Vec2(param) => param.disconnect_set(subscription),
            Self::Vec3(param) => param.disconnect_set(subscription),
            Self::Color(param) => param.disconnect_set(subscription),
            Self::List(param) => param.disconnect_set(subscription),
            Self::Map(param) => param.disconnect_set(subscription),
        }
    }
}

struct Binding {
    slot: ParamSlot,
    subscription: SlotId,
}

/// Builds a [`WebUi`] over a transport.
pub struct WebUiBuilder {
    transport: Rc<RefCell<dyn Transport>>,
    diag: Rc<dyn DiagnosticSink>,
    sync_on_connect: bool,
}

impl WebUiBuilder {
    /// Overrides the diagnostic sink (defaults to [`TracingSink`]).
    pub fn with_diag(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diag = Rc::new(sink);
        self
    }

    /// Pushes a `set` document for every bound parameter whenever a
    /// peer connects. Off by default; peers usually pull with `get`.
    pub fn with_sync_on_connect(mut self, enabled: bool) -> Self {
        self.sync_on_connect = enabled;
        self
    }
}

impl Builder for WebUiBuilder {
    type Output = WebUi;

    fn build(self) -> Result<WebUi> {
        Ok(WebUi {
            transport: self.transport,
            diag: self.diag,
            params: BTreeMap::new(),
            sync_on_connect: self.sync_on_connect,
        })
    }
}

/// The parameter registry and command dispatcher.
pub struct WebUi {
    transport: Rc<RefCell<dyn Transport>>,
    diag: Rc<dyn DiagnosticSink>,
    params: BTreeMap<String, Binding>,
    sync_on_connect: bool,
}

impl WebUi {
    pub fn builder(transport: impl Transport + 'static) -> WebUiBuilder {
        WebUiBuilder {
            transport: Rc::new(RefCell::new(transport)),
            diag: Rc::new(TracingSink),
            sync_on_connect: false,
        }
    }

    /// Starts the transport listening on `port`.
    pub fn listen(&mut self, port: u16) -> Result<()> {
        self.transport.borrow_mut().listen(port)?;
        info!("[UI] listening on port {}", port);
        Ok(())
    }

    /// Registers `param` under `name` and subscribes the outbound
    /// propagation handler: local-origin sets are serialized and sent,
    /// remote-origin sets are suppressed (the value already reflects
    /// what the remote sent).
    ///
    /// Fails with [`UiError::DuplicateName`] if `name` is taken; the
    /// existing binding stays.
    pub fn bind<T>(&mut self, name: &str, param: &Param<T>) -> Result<()>
    where
        T: ParamData,
        ParamSlot: From<Param<T>>,
    {
        if self.params.contains_key(name) {
            return Err(UiError::DuplicateName(name.to_string()));
        }

        let transport = Rc::clone(&self.transport);
        let diag = Rc::clone(&self.diag);
        let outbound_name = name.to_string();
        let subscription = param.on_set(move |origin, value: &T| {
            if origin == Origin::Remote {
                return;
            }
            let doc = event::encode_set(&outbound_name, &value.to_wire());
            if let Err(err) = transport.borrow_mut().write(&doc) {
                diag.error(&err.to_string());
            }
        });

        let slot = ParamSlot::from(param.clone());
        debug!("[UI] bound {} ({}) = {}", name, slot.kind(), slot.stringify());
        self.params.insert(name.to_string(), Binding { slot, subscription });
        Ok(())
    }

    /// Removes the binding and its outbound subscription. Returns
    /// whether the name was bound.
    pub fn unbind(&mut self, name: &str) -> bool {
        match self.params.remove(name) {
            Some(binding) => {
                binding.slot.disconnect(binding.subscription);
                debug!("[UI] unbound {}", name);
                true
            }
            None => false,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Asks the remote side for its current value of `name`.
    pub fn request(&self, name: &str) {
        self.write(&event::encode_get(name));
    }

    /// Drives the transport's pending-event pump. Must be called once
    /// per host tick; no inbound processing happens outside this call.
    pub fn update(&mut self) {
        let events = self.transport.borrow_mut().poll();
        for event in events {
            match event {
                TransportEvent::Connected => {
                    info!("[UI] connect");
                    if self.sync_on_connect {
                        self.push_all();
                    }
                }
                TransportEvent::Disconnected => info!("[UI] disconnect"),
                TransportEvent::Interrupt => info!("[UI] interrupt"),
                TransportEvent::Ping(text) => debug!("[UI] ping: {}", text),
                TransportEvent::Error(detail) => self.diag.error(&detail),
                TransportEvent::Message(text) => self.on_message(&text),
            }
        }
    }

    fn on_message(&mut self, text: &str) {
        debug!("[UI] read: {}", text);
        let decoded = match event::decode_message(text) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.diag.warning(&err);
                return;
            }
        };
        for issue in &decoded.issues {
            self.diag.warning(issue);
        }
        for event in decoded.events {
            match event {
                Event::Get(name) => self.on_get(&name),
                Event::Set(entries) => self.on_set(&entries),
                Event::Select(entries) => self.on_select(&entries),
            }
        }
    }

    fn on_get(&self, name: &str) {
        let Some(binding) = self.params.get(name) else {
            self.diag.warning(&UiError::UnknownParameter(name.to_string()));
            return;
        };
        self.write(&event::encode_set(name, &binding.slot.to_wire()));
    }

    fn on_set(&self, entries: &Map<String, Value>) {
        for (name, wire) in entries {
            let Some(binding) = self.params.get(name) else {
                self.diag.warning(&UiError::UnknownParameter(name.clone()));
                continue;
            };
            if let Err(err) = binding.slot.apply_set(wire, Origin::Remote) {
                self.diag.warning(&err);
            }
        }
    }

    fn on_select(&self, entries: &Map<String, Value>) {
        for (name, wire) in entries {
            let Some(binding) = self.params.get(name) else {
                self.diag.warning(&UiError::UnknownParameter(name.clone()));
                continue;
            };
            if let Err(err) = binding.slot.apply_select(wire, Origin::Remote) {
                self.diag.warning(&err);
            }
        }
    }

    fn push_all(&self) {
        for (name, binding) in &self.params {
            self.write(&event::encode_set(name, &binding.slot.to_wire()));
        }
    }

    fn write(&self, doc: &str) {
        if let Err(err) = self.transport.borrow_mut().write(doc) {
            self.diag.error(&err.to_string());
        }
    }
}
