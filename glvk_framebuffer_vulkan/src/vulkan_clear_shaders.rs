/// Built-in SPIR-V of the clear pipeline stages
///
/// Assembled from `shaders/clear.vert.spvasm` and `shaders/clear.frag.spvasm`
/// (SPIR-V 1.0, no debug names). Both read the `{ vec4 color; float depth; }`
/// push-constant block. The fragment stage writes `color` to locations 0..8;
/// outputs without an attachment are discarded.

/// Full-viewport triangle from `gl_VertexIndex` at z = `depth`
pub(crate) const CLEAR_VERTEX_SPIRV: &[u32] = &[
    0x07230203, 0x00010000, 0x00000000, 0x00000021, 0x00000000, 0x00020011,
    0x00000001, 0x0003000e, 0x00000000, 0x00000001, 0x0007000f, 0x00000000,
    0x00000001, 0x6e69616d, 0x00000000, 0x00000002, 0x00000003, 0x00040047,
    0x00000002, 0x0000000b, 0x0000002a, 0x00040047, 0x00000003, 0x0000000b,
    0x00000000, 0x00030047, 0x00000004, 0x00000002, 0x00050048, 0x00000004,
    0x00000000, 0x00000023, 0x00000000, 0x00050048, 0x00000004, 0x00000001,
    0x00000023, 0x00000010, 0x00020013, 0x00000005, 0x00030021, 0x00000006,
    0x00000005, 0x00030016, 0x00000007, 0x00000020, 0x00040015, 0x00000008,
    0x00000020, 0x00000001, 0x00040017, 0x00000009, 0x00000007, 0x00000004,
    0x0004001e, 0x00000004, 0x00000009, 0x00000007, 0x00040020, 0x0000000a,
    0x00000009, 0x00000004, 0x00040020, 0x0000000b, 0x00000009, 0x00000007,
    0x00040020, 0x0000000c, 0x00000001, 0x00000008, 0x00040020, 0x0000000d,
    0x00000003, 0x00000009, 0x0004002b, 0x00000008, 0x0000000e, 0x00000001,
    0x0004002b, 0x00000008, 0x0000000f, 0x00000002, 0x0004002b, 0x00000007,
    0x00000010, 0x3f800000, 0x0004002b, 0x00000007, 0x00000011, 0x40000000,
    0x0004003b, 0x0000000a, 0x00000012, 0x00000009, 0x0004003b, 0x0000000c,
    0x00000002, 0x00000001, 0x0004003b, 0x0000000d, 0x00000003, 0x00000003,
    0x00050036, 0x00000005, 0x00000001, 0x00000000, 0x00000006, 0x000200f8,
    0x00000013, 0x0004003d, 0x00000008, 0x00000014, 0x00000002, 0x000500c4,
    0x00000008, 0x00000015, 0x00000014, 0x0000000e, 0x000500c7, 0x00000008,
    0x00000016, 0x00000015, 0x0000000f, 0x000500c7, 0x00000008, 0x00000017,
    0x00000014, 0x0000000f, 0x0004006f, 0x00000007, 0x00000018, 0x00000016,
    0x0004006f, 0x00000007, 0x00000019, 0x00000017, 0x00050085, 0x00000007,
    0x0000001a, 0x00000018, 0x00000011, 0x00050083, 0x00000007, 0x0000001b,
    0x0000001a, 0x00000010, 0x00050085, 0x00000007, 0x0000001c, 0x00000019,
    0x00000011, 0x00050083, 0x00000007, 0x0000001d, 0x0000001c, 0x00000010,
    0x00050041, 0x0000000b, 0x0000001e, 0x00000012, 0x0000000e, 0x0004003d,
    0x00000007, 0x0000001f, 0x0000001e, 0x00070050, 0x00000009, 0x00000020,
    0x0000001b, 0x0000001d, 0x0000001f, 0x00000010, 0x0003003e, 0x00000003,
    0x00000020, 0x000100fd, 0x00010038,
];

/// Constant `color` on every float color output
pub(crate) const CLEAR_FRAGMENT_SPIRV: &[u32] = &[
    0x07230203, 0x00010000, 0x00000000, 0x00000018, 0x00000000, 0x00020011,
    0x00000001, 0x0003000e, 0x00000000, 0x00000001, 0x000d000f, 0x00000004,
    0x00000001, 0x6e69616d, 0x00000000, 0x00000002, 0x00000003, 0x00000004,
    0x00000005, 0x00000006, 0x00000007, 0x00000008, 0x00000009, 0x00030010,
    0x00000001, 0x00000007, 0x00040047, 0x00000002, 0x0000001e, 0x00000000,
    0x00040047, 0x00000003, 0x0000001e, 0x00000001, 0x00040047, 0x00000004,
    0x0000001e, 0x00000002, 0x00040047, 0x00000005, 0x0000001e, 0x00000003,
    0x00040047, 0x00000006, 0x0000001e, 0x00000004, 0x00040047, 0x00000007,
    0x0000001e, 0x00000005, 0x00040047, 0x00000008, 0x0000001e, 0x00000006,
    0x00040047, 0x00000009, 0x0000001e, 0x00000007, 0x00030047, 0x0000000a,
    0x00000002, 0x00050048, 0x0000000a, 0x00000000, 0x00000023, 0x00000000,
    0x00050048, 0x0000000a, 0x00000001, 0x00000023, 0x00000010, 0x00020013,
    0x0000000b, 0x00030021, 0x0000000c, 0x0000000b, 0x00030016, 0x0000000d,
    0x00000020, 0x00040015, 0x0000000e, 0x00000020, 0x00000001, 0x00040017,
    0x0000000f, 0x0000000d, 0x00000004, 0x0004001e, 0x0000000a, 0x0000000f,
    0x0000000d, 0x00040020, 0x00000010, 0x00000009, 0x0000000a, 0x00040020,
    0x00000011, 0x00000009, 0x0000000f, 0x00040020, 0x00000012, 0x00000003,
    0x0000000f, 0x0004002b, 0x0000000e, 0x00000013, 0x00000000, 0x0004003b,
    0x00000010, 0x00000014, 0x00000009, 0x0004003b, 0x00000012, 0x00000002,
    0x00000003, 0x0004003b, 0x00000012, 0x00000003, 0x00000003, 0x0004003b,
    0x00000012, 0x00000004, 0x00000003, 0x0004003b, 0x00000012, 0x00000005,
    0x00000003, 0x0004003b, 0x00000012, 0x00000006, 0x00000003, 0x0004003b,
    0x00000012, 0x00000007, 0x00000003, 0x0004003b, 0x00000012, 0x00000008,
    0x00000003, 0x0004003b, 0x00000012, 0x00000009, 0x00000003, 0x00050036,
    0x0000000b, 0x00000001, 0x00000000, 0x0000000c, 0x000200f8, 0x00000015,
    0x00050041, 0x00000011, 0x00000016, 0x00000014, 0x00000013, 0x0004003d,
    0x0000000f, 0x00000017, 0x00000016, 0x0003003e, 0x00000002, 0x00000017,
    0x0003003e, 0x00000003, 0x00000017, 0x0003003e, 0x00000004, 0x00000017,
    0x0003003e, 0x00000005, 0x00000017, 0x0003003e, 0x00000006, 0x00000017,
    0x0003003e, 0x00000007, 0x00000017, 0x0003003e, 0x00000008, 0x00000017,
    0x0003003e, 0x00000009, 0x00000017, 0x000100fd, 0x00010038,
];
