//! End-to-end tests driving the typed API against the simulated kernel.

use ferrite_mock::{MockKernel, Object};
use ferrite_sdk::cap::{CNode, CapRef, CapRights, Endpoint, Notification, Page, Tcb, Untyped};
use ferrite_sdk::invoke::InvocationContext;
use ferrite_sdk::{IpcError, KernelError};
use ferrite_sys::{
    init_slot, object_type, CPtr, InvocationLabel, MessageInfo, MsgRegisters, RawReply, SyscallId,
    Trampoline, Word,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn root() -> CapRef<CNode> {
    CapRef::from_raw(init_slot::ROOT_CNODE)
}

#[test]
fn typed_calls_reach_the_kernel_bit_exact() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(10, Object::Untyped { size_bits: 20 });
    let mut ctx = InvocationContext::new(&kernel);

    let untyped: CapRef<Untyped> = CapRef::from_raw(10);
    untyped
        .retype::<Endpoint>(&mut ctx, root(), 40, 0)
        .unwrap();

    let seen = kernel.last_invocation().unwrap();
    assert_eq!(seen.id, SyscallId::Call);
    assert_eq!(seen.dest, 10);
    assert_eq!(seen.label, InvocationLabel::UntypedRetype as Word);
    assert_eq!(seen.args, vec![object_type::ENDPOINT, 0, 40]);
    assert_eq!(seen.caps, vec![init_slot::ROOT_CNODE]);
}

#[test]
fn endpoint_send_advertises_two_words_and_one_cap() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(
        20,
        Object::Endpoint {
            queue: Default::default(),
        },
    );
    let mut ctx = InvocationContext::new(&kernel);

    let ep: CapRef<Endpoint> = CapRef::from_raw(20);
    ep.send(&mut ctx, &[0xaa, 0xbb], &[init_slot::BOOT_INFO_FRAME])
        .unwrap();

    let seen = kernel.last_invocation().unwrap();
    assert_eq!(seen.label, InvocationLabel::EndpointSend as Word);
    assert_eq!(seen.args, vec![0xaa, 0xbb]);
    assert_eq!(seen.caps.len(), 1);

    let (info, _badge) = ep.recv(&mut ctx).unwrap();
    assert_eq!(info.length(), 2);
    assert_eq!(ctx.message(info), &[0xaa, 0xbb]);
}

#[test]
fn wrong_class_surfaces_as_invalid_capability() {
    init_logging();
    let kernel = MockKernel::new();
    let mut ctx = InvocationContext::new(&kernel);

    // The root CNode is not a thread.
    let bogus: CapRef<Tcb> = CapRef::from_raw(init_slot::ROOT_CNODE);
    let err = bogus.suspend(&mut ctx).unwrap_err();
    assert_eq!(err, IpcError::Kernel(KernelError::InvalidCapability));
}

/// A trampoline standing in for a newer kernel that reports codes this
/// binding has never heard of.
struct FutureKernel;

impl Trampoline for FutureKernel {
    fn syscall(
        &self,
        _id: SyscallId,
        _dest: CPtr,
        _info: MessageInfo,
        _regs: &mut MsgRegisters,
    ) -> RawReply {
        RawReply {
            tag: MessageInfo::new(9999, 0, 0, 0),
            badge: 0,
        }
    }
}

#[test]
fn unknown_error_codes_are_carried_verbatim() {
    init_logging();
    let kernel = FutureKernel;
    let mut ctx = InvocationContext::new(&kernel);

    let tcb: CapRef<Tcb> = CapRef::from_raw(init_slot::ROOT_TCB);
    let err = tcb.suspend(&mut ctx).unwrap_err();
    assert_eq!(err, IpcError::Kernel(KernelError::Unrecognized(9999)));
}

#[test]
fn read_only_capability_cannot_invoke() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(
        20,
        Object::Endpoint {
            queue: Default::default(),
        },
    );
    let mut ctx = InvocationContext::new(&kernel);

    root()
        .copy(&mut ctx, root(), 20, 21, CapRights::READ)
        .unwrap();
    let readonly: CapRef<Endpoint> = CapRef::from_raw(21);
    let err = readonly.call(&mut ctx, &[1], &[]).unwrap_err();
    assert_eq!(err, IpcError::Kernel(KernelError::PermissionDenied));
}

#[test]
fn minted_badge_arrives_with_the_signal() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(
        22,
        Object::Notification {
            word: 0,
            pending: false,
        },
    );
    let mut ctx = InvocationContext::new(&kernel);

    root()
        .mint(&mut ctx, root(), 22, 23, CapRights::all_rights(), 0x40)
        .unwrap();

    let badged: CapRef<Notification> = CapRef::from_raw(23);
    badged.signal(&mut ctx).unwrap();

    let original: CapRef<Notification> = CapRef::from_raw(22);
    assert_eq!(original.wait(&mut ctx).unwrap(), 0x40);
}

#[test]
fn thread_setup_is_ordered_by_the_kernel() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(10, Object::Untyped { size_bits: 20 });
    let mut ctx = InvocationContext::new(&kernel);

    let untyped: CapRef<Untyped> = CapRef::from_raw(10);
    let tcb: CapRef<Tcb> = untyped.retype(&mut ctx, root(), 40, 0).unwrap();

    let err = tcb.resume(&mut ctx).unwrap_err();
    assert_eq!(err, IpcError::Kernel(KernelError::IllegalOperation));

    let fault_ep: CapRef<Endpoint> = untyped.retype(&mut ctx, root(), 41, 0).unwrap();
    let buf_frame: CapRef<Page> = CapRef::from_raw(init_slot::BOOT_INFO_FRAME);
    tcb.configure(
        &mut ctx,
        fault_ep,
        root(),
        0,
        CapRef::from_raw(init_slot::ROOT_VSPACE),
        0,
        0x7f00_0000,
        buf_frame,
    )
    .unwrap();
    tcb.write_registers(&mut ctx, false, &[0x40_0000, 0x7fff_0000])
        .unwrap();
    tcb.resume(&mut ctx).unwrap();
}

#[test]
fn contexts_never_cross_talk() {
    init_logging();
    let kernel = MockKernel::new();
    kernel.install(
        30,
        Object::Endpoint {
            queue: Default::default(),
        },
    );
    kernel.install(
        31,
        Object::Endpoint {
            queue: Default::default(),
        },
    );

    std::thread::scope(|scope| {
        for (slot, payload) in [(30, [0x1111, 0x2222]), (31, [0x3333, 0x4444])] {
            let kernel = &kernel;
            scope.spawn(move || {
                let mut ctx = InvocationContext::new(kernel);
                let ep: CapRef<Endpoint> = CapRef::from_raw(slot);

                for _ in 0..100 {
                    ep.send(&mut ctx, &payload, &[]).unwrap();
                    let (info, _badge) = ep.recv(&mut ctx).unwrap();
                    assert_eq!(ctx.message(info), &payload);
                }
            });
        }
    });
}
