//! Bridge runtime: Wasmtime engine, module loading, and the per-call
//! allocate → encode → start → decode sequence.
//!
//! [`Bridge`] holds the compiled, validated module and can mint
//! [`BridgeInstance`]s. An instance is the long-lived guest from
//! PROTOCOL.md §1: it is reused across calls, and its request
//! workspace is scratch between them. `BridgeInstance::call` takes
//! `&mut self` and the type is not `Sync`, so two in-flight calls
//! against one guest cannot be expressed: the protocol's implicit
//! single-flight assumption made a compile-time fact.

use std::path::Path;

use wasmtime::{Engine, Instance, Linker, Memory, Module, Store, StoreLimitsBuilder};

use gangway_protocol::{
    codec, result::read_error_message, PackedResult, ProtocolVersion, Request, Response,
};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::linker::{register_host_functions, HostState};
use crate::log::{LogSink, TracingSink};
use crate::validation::validate_module;

/// A loaded, validated guest module ready to be instantiated.
pub struct Bridge {
    engine: Engine,
    module: Module,
    config: BridgeConfig,
}

impl Bridge {
    /// Compile a guest module from WASM (or WAT) bytes and validate its
    /// ABI against the configured protocol version.
    pub fn new(wasm_bytes: &[u8], config: BridgeConfig) -> Result<Self, BridgeError> {
        let engine = Engine::default();
        let module = Module::new(&engine, wasm_bytes)?;
        validate_module(&module, config.version)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Load from a `.wasm` file path.
    pub fn from_file(path: &Path, config: BridgeConfig) -> Result<Self, BridgeError> {
        let engine = Engine::default();
        let module = Module::from_file(&engine, path)?;
        validate_module(&module, config.version)?;
        Ok(Self {
            engine,
            module,
            config,
        })
    }

    /// Instantiate the guest with the default `tracing`-backed log sink.
    pub fn instantiate(&self) -> Result<BridgeInstance, BridgeError> {
        self.instantiate_with_sink(Box::new(TracingSink))
    }

    /// Instantiate the guest with a custom debug-log sink.
    pub fn instantiate_with_sink(
        &self,
        sink: Box<dyn LogSink>,
    ) -> Result<BridgeInstance, BridgeError> {
        let state = HostState {
            sink,
            limits: StoreLimitsBuilder::new()
                .memory_size(self.config.max_memory_bytes)
                .build(),
        };
        let mut store = Store::new(&self.engine, state);
        store.limiter(|state| &mut state.limits);

        let mut linker = Linker::new(&self.engine);
        register_host_functions(&mut linker)?;

        let instance = linker.instantiate(&mut store, &self.module)?;
        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| BridgeError::MemoryError("no memory export".into()))?;

        Ok(BridgeInstance {
            store,
            instance,
            memory,
            config: self.config.clone(),
        })
    }
}

/// A live guest instance plus its Wasmtime store.
///
/// Calls must be serialized through `&mut self`; callers needing
/// concurrency use one instance per concurrent call, or queue.
pub struct BridgeInstance {
    store: Store<HostState>,
    instance: Instance,
    memory: Memory,
    config: BridgeConfig,
}

impl BridgeInstance {
    /// Run one request through the guest. This is the primary entry point.
    ///
    /// Performs the full PROTOCOL.md §1 sequence. Local encode overflow
    /// surfaces as `Wire` before the guest is ever invoked; a
    /// guest-reported failure surfaces as `Guest` with the decoded
    /// error-channel message.
    pub fn call(&mut self, request: &Request) -> Result<Response, BridgeError> {
        // 1. Ask the guest to reserve the request workspace.
        let workspace_offset = self.alloc_request()?;
        tracing::trace!(workspace_offset, "request workspace reserved");

        // 2. Encode the request into the workspace.
        let encoded_len = self.write_request(workspace_offset, request)?;
        tracing::trace!(encoded_len, method = %request.method, path = %request.path, "request encoded");

        // 3. Run the request.
        let response_offset = self.start_request()?;
        tracing::trace!(response_offset, "guest produced response");

        // 4. Decode the response from wherever the guest put it.
        self.read_response(response_offset)
    }

    /// Call `gangway_alloc_request` and decode its packed result.
    fn alloc_request(&mut self) -> Result<u32, BridgeError> {
        let size = self.config.arena_size as i32;
        let result = match self.config.version {
            ProtocolVersion::V2 => {
                let func = self
                    .instance
                    .get_typed_func::<i32, i64>(&mut self.store, "gangway_alloc_request")?;
                let raw = handle_trap(func.call(&mut self.store, size))?;
                PackedResult::unpack(raw as u64)
            }
            ProtocolVersion::V1 => {
                let func = self
                    .instance
                    .get_typed_func::<i32, i32>(&mut self.store, "gangway_alloc_request")?;
                let raw = handle_trap(func.call(&mut self.store, size))?;
                PackedResult::from_bare(raw as u32)
            }
        };
        self.expect_offset(result)
    }

    /// Call `gangway_start_request` and decode its packed result.
    fn start_request(&mut self) -> Result<u32, BridgeError> {
        let result = match self.config.version {
            ProtocolVersion::V2 => {
                let func = self
                    .instance
                    .get_typed_func::<(), i64>(&mut self.store, "gangway_start_request")?;
                let raw = handle_trap(func.call(&mut self.store, ()))?;
                PackedResult::unpack(raw as u64)
            }
            ProtocolVersion::V1 => {
                let func = self
                    .instance
                    .get_typed_func::<(), i32>(&mut self.store, "gangway_start_request")?;
                let raw = handle_trap(func.call(&mut self.store, ()))?;
                PackedResult::from_bare(raw as u32)
            }
        };
        self.expect_offset(result)
    }

    /// Turn a packed result into an offset, decoding the error channel
    /// on failure. The low half has already been tested by `unpack`;
    /// only a failure reads the auxiliary half.
    fn expect_offset(&mut self, result: PackedResult) -> Result<u32, BridgeError> {
        match result {
            PackedResult::Success { offset } => Ok(offset),
            PackedResult::Failure { error_offset: 0 } => {
                // V1 failures and degenerate V2 failures carry no message.
                Err(BridgeError::Guest("guest reported no error message".into()))
            }
            PackedResult::Failure { error_offset } => {
                let mem = self.memory.data(&self.store);
                let message = read_error_message(mem, error_offset)
                    .unwrap_or_else(|_| "guest error message unreadable".into());
                Err(BridgeError::Guest(message))
            }
        }
    }

    /// Encode `request` into the workspace at `offset`.
    ///
    /// The workspace slice handed to the encoder is exactly
    /// `arena_size` bytes, so the codec's overflow bound is the
    /// protocol's: nothing is ever written past the reservation.
    fn write_request(&mut self, offset: u32, request: &Request) -> Result<usize, BridgeError> {
        let start = offset as usize;
        let arena = self.config.arena_size as usize;
        let version = self.config.version;
        let mem = self.memory.data_mut(&mut self.store);

        let end = start
            .checked_add(arena)
            .filter(|&end| end <= mem.len())
            .ok_or_else(|| {
                BridgeError::MemoryError(format!(
                    "workspace [{start}, {start}+{arena}) exceeds memory size {}",
                    mem.len()
                ))
            })?;

        Ok(codec::encode_request(&mut mem[start..end], request, version)?)
    }

    /// Decode the response starting at `offset`.
    fn read_response(&mut self, offset: u32) -> Result<Response, BridgeError> {
        let start = offset as usize;
        let mem = self.memory.data(&self.store);
        if start >= mem.len() {
            return Err(BridgeError::MemoryError(format!(
                "response offset {start} exceeds memory size {}",
                mem.len()
            )));
        }
        Ok(codec::decode_response(&mem[start..])?)
    }
}

/// Handle a guest function call result, converting traps to
/// `GuestTrapped`.
fn handle_trap<R>(result: Result<R, anyhow::Error>) -> Result<R, BridgeError> {
    result.map_err(|e| BridgeError::GuestTrapped(format!("{e}")))
}
