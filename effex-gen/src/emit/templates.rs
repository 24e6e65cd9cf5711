//! Handlebars templates for the Effect-TS artifacts
//!
//! Every block tag shares its line with literal text, so the output does not
//! depend on standalone-line trimming.

/// Row validation schemas (`select<Model>Schema`, `insert<Model>Schema`)
pub const SCHEMA_TEMPLATE: &str = r"import { Schema } from 'effect'

{{#if array_override}}const select{{model}}Fields = {
{{#each select_fields}}  {{name}}: {{expr}},
{{/each}}}

const insert{{model}}Fields = {
{{#each insert_fields}}  {{name}}: {{expr}},
{{/each}}}

// Array columns, typed by element in the fields above
const select{{model}}ArrayFields = {
{{#each select_array_fields}}  {{name}}: {{expr}},
{{/each}}}

const insert{{model}}ArrayFields = {
{{#each insert_array_fields}}  {{name}}: {{expr}},
{{/each}}}

export const select{{model}}Schema = Schema.Struct({
  ...select{{model}}Fields,
  ...select{{model}}ArrayFields,
})

export const insert{{model}}Schema = Schema.Struct({
  ...insert{{model}}Fields,
  ...insert{{model}}ArrayFields,
})

{{else}}export const select{{model}}Schema = Schema.Struct({
{{#each select_fields}}  {{name}}: {{expr}},
{{/each}}})

export const insert{{model}}Schema = Schema.Struct({
{{#each insert_fields}}  {{name}}: {{expr}},
{{/each}}})

{{/if}}export type Select{{model}} = typeof select{{model}}Schema.Type
export type Insert{{model}} = typeof insert{{model}}Schema.Type
";

/// Error classes shared by both service templates
const SERVICE_ERRORS: &str = r"export class DatabaseError extends Schema.TaggedError<DatabaseError>()('DatabaseError', {
  cause: Schema.Unknown,
}) {}

export class {{model}}NotFound extends Schema.TaggedError<{{model}}NotFound>()('{{model}}NotFound', {
  id: {{id_schema}},
}) {}

{{#if has_unique}}export class ConflictError extends Schema.TaggedError<ConflictError>()('ConflictError', {
  message: Schema.String,
  cause: Schema.Unknown,
}) {}

const isUniqueViolation = (error: unknown): boolean => {
  if (typeof error !== 'object' || error === null) return false
  if ('code' in error && error.code === '{{unique_violation_code}}') return true
  return 'cause' in error && isUniqueViolation(error.cause)
}

{{/if}}type {{model}}Id = {{id_type}}

const toDatabaseError = (error: unknown) => new DatabaseError({ cause: error })

{{#if has_unique}}const toWriteError = (error: unknown) =>
  isUniqueViolation(error)
    ? new ConflictError({ message: 'Unique constraint violated on {{table_name}}', cause: error })
    : new DatabaseError({ cause: error })

{{else}}const toWriteError = toDatabaseError

{{/if}}const decode{{model}} = (row: unknown) =>
  Schema.decodeUnknown(select{{model}}Schema)(row).pipe(Effect.mapError(toDatabaseError))
";

/// Service class footer shared by both service templates
const SERVICE_TAG: &str = r"export class {{model}}Service extends Context.Tag('{{model}}Service')<
  {{model}}Service,
  Effect.Effect.Success<typeof make{{model}}Service>
>() {
  static readonly Live = Layer.effect({{model}}Service, make{{model}}Service)
}
";

const DRIZZLE_SERVICE_IMPORTS: &str = r"import * as PgDrizzle from '@effect/sql-drizzle/Pg'
import { eq } from 'drizzle-orm'
import { Context, Effect, Layer, Schema } from 'effect'

import type { Insert{{model}} } from '{{schema_module}}'
import { select{{model}}Schema } from '{{schema_module}}'
import { {{binding}} } from '{{table_import}}'

";

const DRIZZLE_SERVICE_BODY: &str = r"
const make{{model}}Service = Effect.gen(function* () {
  const db = yield* PgDrizzle.PgDrizzle

  const find{{model}} = (id: {{model}}Id) =>
    db
      .select()
      .from({{binding}})
      .where(eq({{binding}}.{{pk}}, id))
      .limit(1)
      .pipe(
        Effect.mapError(toDatabaseError),
        Effect.flatMap(rows =>
          rows[0] ? Effect.succeed(rows[0]) : Effect.fail(new {{model}}NotFound({ id }))
        )
      )

  return {
    getAll{{collection}}: db
      .select()
      .from({{binding}})
      .pipe(
        Effect.mapError(toDatabaseError),
        Effect.flatMap(rows => Effect.forEach(rows, decode{{model}}))
      ),

    get{{model}}ById: (id: {{model}}Id) => find{{model}}(id).pipe(Effect.flatMap(decode{{model}})),

    create{{model}}: (data: Insert{{model}}) =>
      db
        .insert({{binding}})
        .values(data)
        .returning()
        .pipe(
          Effect.mapError(toWriteError),
          Effect.flatMap(rows =>
            rows[0]
              ? Effect.succeed(rows[0])
              : Effect.fail(new DatabaseError({ cause: 'No row returned after insert' }))
          ),
          Effect.flatMap(decode{{model}})
        ),

    update{{model}}: (id: {{model}}Id, data: Partial<Insert{{model}}>) =>
      Effect.gen(function* () {
        yield* find{{model}}(id)
        const rows = yield* db
          .update({{binding}})
          .set(data)
          .where(eq({{binding}}.{{pk}}, id))
          .returning()
          .pipe(Effect.mapError(toWriteError))
        const updated = rows[0]
        if (!updated) {
          return yield* Effect.fail(new {{model}}NotFound({ id }))
        }
        return yield* decode{{model}}(updated)
      }),

    delete{{model}}: (id: {{model}}Id) =>
      Effect.gen(function* () {
        const existing = yield* find{{model}}(id)
        yield* db
          .delete({{binding}})
          .where(eq({{binding}}.{{pk}}, id))
          .pipe(Effect.mapError(toDatabaseError))
        return yield* decode{{model}}(existing)
      }),
  }
})

";

const PRISMA_SERVICE_IMPORTS: &str = r"import { Context, Effect, Layer, Option, Schema } from 'effect'

import type { Insert{{model}} } from '{{schema_module}}'
import { select{{model}}Schema } from '{{schema_module}}'
import { PrismaDatabase } from '{{prisma_client_import}}'

";

const PRISMA_SERVICE_BODY: &str = r"
const make{{model}}Service = Effect.gen(function* () {
  const prisma = yield* PrismaDatabase
  const delegate = prisma.{{delegate}}

  const run = <A>(operation: () => Promise<A>) =>
    Effect.tryPromise({ try: operation, catch: toDatabaseError })
  const write = <A>(operation: () => Promise<A>) =>
    Effect.tryPromise({ try: operation, catch: toWriteError })
  const decodeAll = (rows: ReadonlyArray<unknown>) => Effect.forEach(rows, decode{{model}})

  const find{{model}} = (id: {{model}}Id) =>
    run(() => delegate.findUnique({ where: { {{pk}}: id } })).pipe(
      Effect.flatMap(row => (row ? Effect.succeed(row) : Effect.fail(new {{model}}NotFound({ id }))))
    )

  return {
    getAll{{collection}}: run(() => delegate.findMany()).pipe(Effect.flatMap(decodeAll)),

    get{{model}}ById: (id: {{model}}Id) => find{{model}}(id).pipe(Effect.flatMap(decode{{model}})),

    create{{model}}: (data: Insert{{model}}) =>
      write(() => delegate.create({ data })).pipe(Effect.flatMap(decode{{model}})),

    update{{model}}: (id: {{model}}Id, data: Partial<Insert{{model}}>) =>
      Effect.gen(function* () {
        yield* find{{model}}(id)
        const updated = yield* write(() => delegate.update({ where: { {{pk}}: id }, data }))
        return yield* decode{{model}}(updated)
      }),

    delete{{model}}: (id: {{model}}Id) =>
      Effect.gen(function* () {
        const existing = yield* find{{model}}(id)
        yield* run(() => delegate.delete({ where: { {{pk}}: id } }))
        return yield* decode{{model}}(existing)
      }),

    findMany: (args?: Parameters<typeof delegate.findMany>[0]) =>
      run(() => delegate.findMany(args)).pipe(Effect.flatMap(decodeAll)),

    findFirst: (args?: Parameters<typeof delegate.findFirst>[0]) =>
      run(() => delegate.findFirst(args)).pipe(
        Effect.flatMap(row =>
          row ? Effect.map(decode{{model}}(row), Option.some) : Effect.succeed(Option.none())
        )
      ),

    findUniqueOrThrow: (args: Parameters<typeof delegate.findUniqueOrThrow>[0]) =>
      run(() => delegate.findUniqueOrThrow(args)).pipe(Effect.flatMap(decode{{model}})),

    findFirstOrThrow: (args?: Parameters<typeof delegate.findFirstOrThrow>[0]) =>
      run(() => delegate.findFirstOrThrow(args)).pipe(Effect.flatMap(decode{{model}})),

    count: (args?: Parameters<typeof delegate.count>[0]) => run(() => delegate.count(args)),

    createMany: (args: Parameters<typeof delegate.createMany>[0]) =>
      write(() => delegate.createMany(args)).pipe(Effect.map(result => result.count)),

    createManyAndReturn: (args: Parameters<typeof delegate.createManyAndReturn>[0]) =>
      write(() => delegate.createManyAndReturn(args)).pipe(Effect.flatMap(decodeAll)),

    updateMany: (args: Parameters<typeof delegate.updateMany>[0]) =>
      write(() => delegate.updateMany(args)).pipe(Effect.map(result => result.count)),

    updateManyAndReturn: (args: Parameters<typeof delegate.updateManyAndReturn>[0]) =>
      write(() => delegate.updateManyAndReturn(args)).pipe(Effect.flatMap(decodeAll)),

    upsert: (args: Parameters<typeof delegate.upsert>[0]) =>
      write(() => delegate.upsert(args)).pipe(Effect.flatMap(decode{{model}})),

    deleteMany: (args?: Parameters<typeof delegate.deleteMany>[0]) =>
      run(() => delegate.deleteMany(args)).pipe(Effect.map(result => result.count)),

    aggregate: (args: Parameters<typeof delegate.aggregate>[0]) => run(() => delegate.aggregate(args)),

    groupBy: (args: Parameters<typeof delegate.groupBy>[0]) => run(() => delegate.groupBy(args)),
  }
})

";

/// CRUD service over a Drizzle table
#[must_use]
pub fn drizzle_service_template() -> String {
    format!("{DRIZZLE_SERVICE_IMPORTS}{SERVICE_ERRORS}{DRIZZLE_SERVICE_BODY}{SERVICE_TAG}")
}

/// CRUD service plus client delegate pass-throughs for a schema model
#[must_use]
pub fn prisma_service_template() -> String {
    format!("{PRISMA_SERVICE_IMPORTS}{SERVICE_ERRORS}{PRISMA_SERVICE_BODY}{SERVICE_TAG}")
}

/// Domain type aliases derived from the row schemas
pub const TYPES_TEMPLATE: &str = r"import type { Insert{{model}}, Select{{model}} } from '{{schema_module}}'

export type {{model}} = Select{{model}}
export type New{{model}} = Insert{{model}}
export type {{model}}Update = Partial<New{{model}}>
export type {{model}}Id = {{id_type}}
";

/// Form validation schema decoding string inputs
pub const FORM_TEMPLATE: &str = r"import { Schema } from 'effect'

export const {{camel}}FormSchema = Schema.Struct({
{{#each form_fields}}  {{name}}: {{expr}},
{{/each}}})

export type {{model}}FormInput = typeof {{camel}}FormSchema.Encoded
export type {{model}}FormValues = typeof {{camel}}FormSchema.Type
";
