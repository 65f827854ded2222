// Shared fixtures for the session integration tests
#![allow(dead_code)]

use std::rc::Rc;

use irbind_core::{Session, SessionConfig};
use irbind_sim::SimLibrary;
use irbind_sys::{ContextRef, MetadataKind, MetadataRef, TypeKind, TypeRef, ValueKind, ValueRef};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub sim: Rc<SimLibrary>,
    pub session: Session,
}

pub fn fixture() -> Fixture {
    fixture_with(SessionConfig::default())
}

pub fn fixture_with(config: SessionConfig) -> Fixture {
    init_logger();
    let sim = Rc::new(SimLibrary::new());
    let session = Session::with_config(sim.clone(), config).unwrap();
    Fixture { sim, session }
}

/// A second session on the same native library.
pub fn sibling(fixture: &Fixture) -> Session {
    Session::new(fixture.sim.clone()).unwrap()
}

impl Fixture {
    pub fn context(&self) -> ContextRef {
        self.session.context_handle()
    }

    pub fn value(&self, kind: ValueKind, name: &str) -> ValueRef {
        self.sim.add_value(self.context(), kind, name).unwrap()
    }

    pub fn value_tag(&self, tag: u32) -> ValueRef {
        self.sim.add_value_raw(self.context(), tag, "").unwrap()
    }

    pub fn metadata(&self, kind: MetadataKind) -> MetadataRef {
        self.sim.add_metadata(self.context(), kind).unwrap()
    }

    pub fn ty(&self, kind: TypeKind) -> TypeRef {
        self.sim.add_type(self.context(), kind).unwrap()
    }
}
